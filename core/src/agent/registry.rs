use crate::error::{BotError, Result};
use crate::traits::{Tool, ToolResult, ToolSpec};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

pub struct ToolRegistry {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, tool: Box<dyn Tool>) -> Result<()> {
        let mut tools = self.tools();
        if tools.iter().any(|t| t.name() == tool.name()) {
            return Err(BotError::DuplicateTool(tool.name().to_string()));
        }
        tools.push(Arc::from(tool));
        Ok(())
    }

    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.tools().iter().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools().iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools().is_empty()
    }

    pub async fn invoke(&self, name: &str, args: serde_json::Value) -> Result<ToolResult> {
        let tool = self
            .find(name)
            .ok_or_else(|| BotError::UnknownTool(name.to_string()))?;

        info!(tool = name, "Invoking tool");
        tool.execute(args)
            .await
            .map_err(|e| BotError::ToolExecution {
                name: name.to_string(),
                message: format!("{e:#}"),
            })
    }

    pub async fn execute(&self, name: &str, args: serde_json::Value) -> ToolResult {
        match self.invoke(name, args).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                ToolResult::error(e.to_string())
            }
        }
    }

    fn find(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools().iter().find(|t| t.name() == name).cloned()
    }

    fn tools(&self) -> MutexGuard<'_, Vec<Arc<dyn Tool>>> {
        self.tools.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
