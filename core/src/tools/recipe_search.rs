use crate::tools::extract_string_arg;
use crate::traits::{RecipeSearchProvider, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct SearchRecipesTool {
    index: Arc<dyn RecipeSearchProvider>,
}

impl SearchRecipesTool {
    pub fn new(index: Arc<dyn RecipeSearchProvider>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for SearchRecipesTool {
    fn name(&self) -> &str {
        "search_recipes"
    }

    fn description(&self) -> &str {
        "Search for recipes based on a food name. Returns recipe ids, titles and ingredient lists."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Dish or food name to search for"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let query = extract_string_arg(&args, "query")?;
        let recipes = self.index.search(&query).await?;
        Ok(ToolResult::success(serde_json::to_value(recipes)?))
    }
}
