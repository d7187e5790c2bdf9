use serde_json::Value;

pub mod purchase;
pub mod recipe_search;

pub use purchase::ExecutePurchaseTool;
pub use recipe_search::SearchRecipesTool;

pub fn extract_string_arg(args: &Value, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}

pub fn extract_string_list_arg(args: &Value, key: &str) -> anyhow::Result<Vec<String>> {
    let values = args
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))?;

    values
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("'{}' must be a list of strings", key))
        })
        .collect()
}
