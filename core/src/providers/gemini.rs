//! Google Gemini client for the `generateContent` endpoint.
//!
//! Function calls come back as `functionCall` parts and are answered with
//! `functionResponse` parts in a following user turn. The wire format does not
//! carry call ids, so tool result messages are matched to their call by the id
//! the conversation assigned, then sent by function name.

use crate::traits::{ChatMessage, ChatRequest, ChatResponse, Provider, ToolCall, ToolSpec};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct FunctionCallingConfig {
    mode: &'static str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
    /// Returned next to a `functionCall` by thinking models and required back
    /// verbatim in the follow-up request.
    #[serde(skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: crate::config::DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            temperature: 1.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, request: ChatRequest<'_>) -> GeminiRequest {
        let system_instruction = request
            .messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| GeminiContent {
                role: None,
                parts: vec![text_part(&m.content)],
            });

        let tools = request.tools.filter(|t| !t.is_empty()).map(convert_tools);
        let tool_config = tools.as_ref().map(|_| GeminiToolConfig {
            function_calling_config: FunctionCallingConfig { mode: "AUTO" },
        });

        GeminiRequest {
            contents: convert_messages(request.messages),
            system_instruction,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
            tools,
            tool_config,
        }
    }
}

fn text_part(text: &str) -> GeminiPart {
    GeminiPart {
        text: Some(text.to_string()),
        ..Default::default()
    }
}

fn convert_tools(tools: &[ToolSpec]) -> Vec<GeminiTool> {
    vec![GeminiTool {
        function_declarations: tools
            .iter()
            .map(|t| GeminiFunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters_schema.clone(),
            })
            .collect(),
    }]
}

fn convert_messages(messages: &[ChatMessage]) -> Vec<GeminiContent> {
    let mut call_names: HashMap<&str, &str> = HashMap::new();
    let mut contents: Vec<GeminiContent> = Vec::new();

    for m in messages {
        match m.role.as_str() {
            "system" => {}
            "assistant" => {
                let mut parts = Vec::new();
                if !m.content.is_empty() {
                    parts.push(text_part(&m.content));
                }
                for call in m.tool_calls.iter().flatten() {
                    call_names.insert(&call.id, &call.name);
                    parts.push(GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            name: call.name.clone(),
                            args: serde_json::from_str(&call.arguments)
                                .unwrap_or_else(|_| json!({})),
                        }),
                        thought_signature: call.signature.clone(),
                        ..Default::default()
                    });
                }
                if parts.is_empty() {
                    parts.push(text_part(""));
                }
                contents.push(GeminiContent {
                    role: Some("model".to_string()),
                    parts,
                });
            }
            "tool" => {
                let name = m
                    .tool_call_id
                    .as_deref()
                    .and_then(|id| call_names.get(id).copied())
                    .unwrap_or("unknown")
                    .to_string();
                let response = match serde_json::from_str::<Value>(&m.content) {
                    Ok(value @ Value::Object(_)) => value,
                    Ok(value) => json!({ "result": value }),
                    Err(_) => json!({ "result": m.content }),
                };
                let part = GeminiPart {
                    function_response: Some(GeminiFunctionResponse { name, response }),
                    ..Default::default()
                };

                // Answers to one batch of calls travel in a single user turn.
                match contents.last_mut() {
                    Some(last)
                        if last.role.as_deref() == Some("user")
                            && last.parts.iter().all(|p| p.function_response.is_some()) =>
                    {
                        last.parts.push(part);
                    }
                    _ => contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
            _ => contents.push(GeminiContent {
                role: Some("user".to_string()),
                parts: vec![text_part(&m.content)],
            }),
        }
    }

    contents
}

fn into_chat_response(response: GeminiResponse) -> anyhow::Result<ChatResponse> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        anyhow::bail!("Gemini returned no answer ({})", reason);
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(fc) = part.function_call {
            tool_calls.push(ToolCall {
                id: format!("call_{}", tool_calls.len()),
                name: fc.name,
                arguments: fc.args.to_string(),
                signature: part.thought_signature,
            });
        }
    }

    if text.is_empty() && tool_calls.is_empty() {
        anyhow::bail!(
            "Empty response from Gemini (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }

    Ok(ChatResponse {
        text: if text.is_empty() { None } else { Some(text) },
        tool_calls,
    })
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let gemini_request = self.build_request(request);

        info!(
            model = %self.model,
            tools = gemini_request.tools.as_ref().map_or(0, |t| t[0].function_declarations.len()),
            "Gemini generateContent"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .context("Failed to send Gemini request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, body);
            anyhow::bail!("Gemini API error {}: {}", status, body);
        }

        let raw_body = response
            .text()
            .await
            .context("Failed to read Gemini response body")?;
        debug!(bytes = raw_body.len(), "Gemini response received");

        let parsed: GeminiResponse =
            serde_json::from_str(&raw_body).context("Failed to parse Gemini response")?;

        into_chat_response(parsed)
    }
}
