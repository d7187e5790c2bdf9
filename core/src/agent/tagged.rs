//! Parsing of `<tool_call>{...}</tool_call>` blocks written into plain model
//! text, for backends without native function calling.

use crate::traits::ToolCall;
use serde_json::Value;

const OPEN_TAG: &str = "<tool_call>";
const CLOSE_TAG: &str = "</tool_call>";

pub fn parse_tool_calls(response: &str) -> (String, Vec<ToolCall>) {
    let mut text_parts = Vec::new();
    let mut calls = Vec::new();
    let mut remaining = response;

    while let Some(start) = remaining.find(OPEN_TAG) {
        let after_open = &remaining[start + OPEN_TAG.len()..];
        let Some(close_idx) = after_open.find(CLOSE_TAG) else {
            break;
        };

        let before = remaining[..start].trim();
        if !before.is_empty() {
            text_parts.push(before.to_string());
        }

        for value in extract_json_values(&after_open[..close_idx]) {
            if let Some(call) = to_tool_call(&value, calls.len()) {
                calls.push(call);
            }
        }

        remaining = &after_open[close_idx + CLOSE_TAG.len()..];
    }

    let rest = remaining.trim();
    if !rest.is_empty() {
        text_parts.push(rest.to_string());
    }

    (text_parts.join("\n"), calls)
}

fn extract_json_values(text: &str) -> Vec<Value> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0
                    && let Some(s) = start.take()
                    && let Ok(value) = serde_json::from_str::<Value>(&text[s..=i])
                {
                    values.push(value);
                }
            }
            _ => {}
        }
    }

    values
}

fn to_tool_call(value: &Value, index: usize) -> Option<ToolCall> {
    let name = value.get("name")?.as_str()?.to_string();
    let arguments = serde_json::to_string(value.get("arguments")?).ok()?;
    let id = format!("call_{}_{:x}", index, md5::compute(arguments.as_bytes()));

    Some(ToolCall {
        id,
        name,
        arguments,
        signature: None,
    })
}
