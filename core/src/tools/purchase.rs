use crate::session::SessionState;
use crate::tools::extract_string_list_arg;
use crate::traits::{PurchaseProvider, Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct ExecutePurchaseTool {
    checkout: Arc<dyn PurchaseProvider>,
    session: Arc<SessionState>,
}

impl ExecutePurchaseTool {
    pub fn new(checkout: Arc<dyn PurchaseProvider>, session: Arc<SessionState>) -> Self {
        Self { checkout, session }
    }
}

#[async_trait]
impl Tool for ExecutePurchaseTool {
    fn name(&self) -> &str {
        "execute_purchase"
    }

    fn description(&self) -> &str {
        "Buy ingredients. Use ONLY after the user explicitly confirms the list."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Names of the ingredients to buy"
                }
            },
            "required": ["items"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let items = extract_string_list_arg(&args, "items")?;
        let receipt = self.checkout.purchase(&items).await?;
        self.session.record_purchase(&items);
        Ok(ToolResult::success(serde_json::to_value(receipt)?))
    }
}
