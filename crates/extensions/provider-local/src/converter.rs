//! Message conversion for the local chat API.

use pagehands_protocols::provider::CompletionRequest;
use pagehands_protocols::types::{Message, MessageRole};

use crate::api::ApiMessage;

/// Convert the system prompt and history to the simplified chat array.
pub fn convert_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.is_empty() {
        messages.push(ApiMessage {
            role: "system".to_string(),
            content: request.system.clone(),
        });
    }
    messages.extend(request.messages.iter().map(convert_message));
    messages
}

fn convert_message(msg: &Message) -> ApiMessage {
    match msg.role {
        MessageRole::Tool => ApiMessage {
            role: "user".to_string(),
            content: format!("Tool result: {}", msg.content),
        },
        MessageRole::Assistant if msg.has_tool_calls() => {
            let names: Vec<&str> = msg.tool_calls.iter().map(|tc| tc.name.as_str()).collect();
            let note = format!("[called tools: {}]", names.join(", "));
            let content = if msg.content.is_empty() {
                note
            } else {
                format!("{}\n{}", msg.content, note)
            };
            ApiMessage {
                role: "assistant".to_string(),
                content,
            }
        }
        _ => ApiMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        },
    }
}
