pub mod catalog;
pub mod provider;
pub mod tool;

pub use catalog::{PurchaseProvider, PurchaseReceipt, Recipe, RecipeSearchProvider};
pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolCall};
pub use tool::{Tool, ToolResult, ToolSpec};
