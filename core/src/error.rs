use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("tool '{0}' not found")]
    UnknownTool(String),

    #[error("tool '{name}' failed: {message}")]
    ToolExecution { name: String, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("gave up after {0} tool-call round-trips without a final answer")]
    ToolLoopLimit(usize),
}

impl BotError {
    pub fn transport(err: &anyhow::Error) -> Self {
        Self::Transport(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to send Gemini request");
        let msg = BotError::transport(&err).to_string();
        assert_eq!(msg, "Failed to send Gemini request: connection refused");
    }

    #[test]
    fn tool_execution_names_the_tool() {
        let err = BotError::ToolExecution {
            name: "search_recipes".into(),
            message: "Missing 'query' parameter".into(),
        };
        assert_eq!(
            err.to_string(),
            "tool 'search_recipes' failed: Missing 'query' parameter"
        );
    }
}
