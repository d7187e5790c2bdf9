use crate::traits::{Recipe, RecipeSearchProvider};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct MockRecipeIndex;

impl MockRecipeIndex {
    pub fn new() -> Self {
        Self
    }

    pub fn lookup(query: &str) -> Vec<Recipe> {
        if query.to_lowercase().contains("taco") {
            return vec![
                recipe(
                    "rec_01",
                    "Street Style Tacos",
                    &["Mini Corn Tortillas", "Carne Asada", "Onion", "Cilantro"],
                ),
                recipe(
                    "rec_02",
                    "Vegetarian Tacos",
                    &["Corn Tortillas", "Black Beans", "Avocado", "Salsa"],
                ),
            ];
        }

        vec![Recipe {
            id: "rec_99".to_string(),
            title: format!("Generic {} Dish", query),
            ingredients: vec![
                format!("Fresh {}", query),
                "Salt".to_string(),
                "Olive Oil".to_string(),
            ],
        }]
    }
}

fn recipe(id: &str, title: &str, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
    }
}

#[async_trait]
impl RecipeSearchProvider for MockRecipeIndex {
    fn name(&self) -> &str {
        "mock-index"
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<Recipe>> {
        info!(query, "Searching recipe index");
        Ok(Self::lookup(query))
    }
}
