use crate::session::SessionState;
use crate::traits::{ChatMessage, ToolSpec};
use std::fmt::Write;

pub const SYSTEM_PREAMBLE: &str = "Role: You are \"Cookin' Bot\", a helpful shopping assistant.
Rules:
1. Always search for recipes first. Do not make up ingredients.
2. Before buying, list the ingredients and ask for confirmation.
3. If the user confirms, call 'execute_purchase'.
4. Be brief and friendly.";

pub fn compose(session: &SessionState, user_text: &str) -> String {
    let cart = session.current();
    let cart_status = if cart.is_empty() {
        "Current Cart: Empty".to_string()
    } else {
        format!("Current Cart: {}", cart.join(", "))
    };

    format!("[System Info: {}]\nUser says: {}", cart_status, user_text)
}

pub struct ContextBuilder {
    pub preamble: String,
    pub tool_specs: Vec<ToolSpec>,
    pub tagged_tool_calls: bool,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            preamble: SYSTEM_PREAMBLE.to_string(),
            tool_specs: vec![],
            tagged_tool_calls: false,
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn with_tool_specs(mut self, tool_specs: Vec<ToolSpec>) -> Self {
        self.tool_specs = tool_specs;
        self
    }

    pub fn with_tagged_tool_calls(mut self, enabled: bool) -> Self {
        self.tagged_tool_calls = enabled;
        self
    }

    pub fn build_system_prompt(&self) -> String {
        if !self.tagged_tool_calls || self.tool_specs.is_empty() {
            return self.preamble.clone();
        }

        format!("{}\n\n---\n\n{}", self.preamble, self.get_tool_instructions())
    }

    fn get_tool_instructions(&self) -> String {
        let mut instructions = String::new();
        instructions.push_str("## Tool Use Protocol\n\n");
        instructions.push_str("To use a tool, wrap a JSON object in <tool_call> tags:\n\n");
        instructions.push_str("```\n<tool_call>\n{\"name\": \"tool_name\", \"arguments\": {\"param\": \"value\"}}\n</tool_call>\n```\n\n");
        instructions.push_str("You may use multiple tool calls in a single response. ");
        instructions.push_str("Tool results come back as tool messages. ");
        instructions
            .push_str("Continue with the results until you can give a final answer.\n\n");
        instructions.push_str("### Available Tools\n\n");

        for tool in &self.tool_specs {
            let _ = writeln!(
                instructions,
                "**{}**: {}\nParameters: `{}`\n",
                tool.name, tool.description, tool.parameters_schema
            );
        }

        instructions
    }

    pub fn build_messages(
        &self,
        history: &[ChatMessage],
        session: &SessionState,
        user_text: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.build_system_prompt())];
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(compose(session, user_text)));
        messages
    }
}
