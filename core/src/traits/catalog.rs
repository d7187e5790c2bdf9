use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub status: String,
    pub transaction_id: String,
    pub message: String,
}

#[async_trait]
pub trait RecipeSearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> anyhow::Result<Vec<Recipe>>;
}

#[async_trait]
pub trait PurchaseProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn purchase(&self, items: &[String]) -> anyhow::Result<PurchaseReceipt>;
}
