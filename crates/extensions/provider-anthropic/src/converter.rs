//! Message and tool conversion utilities.

use pagehands_protocols::provider::CompletionRequest;
use pagehands_protocols::types::{Message, MessageRole};

use crate::api::{ApiContent, ApiMessage, ApiTool, ContentBlock};

/// Build the separate `system` field.
///
/// System-role history entries have no place in the message list, so they are
/// appended to the request's system prompt.
pub fn convert_system(request: &CompletionRequest) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    if !request.system.is_empty() {
        parts.push(&request.system);
    }
    parts.extend(
        request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System && !m.content.is_empty())
            .map(|m| m.content.as_str()),
    );
    if parts.is_empty() { None } else { Some(parts.join("\n\n")) }
}

/// Convert messages to Anthropic API format.
///
/// Tool-role turns become user turns carrying `tool_result` blocks; results
/// answering the same assistant turn are merged into one user message. The
/// list must open with a plain user turn, so anything a trimmed history left
/// ahead of the first one is dropped.
pub fn convert_messages(messages: &[Message]) -> Vec<ApiMessage> {
    let mut converted: Vec<ApiMessage> = Vec::with_capacity(messages.len());

    for message in messages.iter().filter(|m| m.role != MessageRole::System) {
        if message.role == MessageRole::Tool {
            let block = tool_result_block(message);
            if let Some(last) = converted.last_mut() {
                if let (true, ApiContent::Blocks(blocks)) = (last.role == "user", &mut last.content) {
                    if blocks.iter().all(|b| matches!(b, ContentBlock::ToolResult { .. })) {
                        blocks.push(block);
                        continue;
                    }
                }
            }
            converted.push(ApiMessage {
                role: "user".to_string(),
                content: ApiContent::Blocks(vec![block]),
            });
            continue;
        }

        converted.push(ApiMessage {
            role: match message.role {
                MessageRole::Assistant => "assistant".to_string(),
                _ => "user".to_string(),
            },
            content: convert_content(message),
        });
    }

    let start = converted
        .iter()
        .position(|m| m.role == "user" && matches!(m.content, ApiContent::Text(_)))
        .unwrap_or(converted.len());
    converted.drain(..start);
    converted
}

fn tool_result_block(message: &Message) -> ContentBlock {
    ContentBlock::ToolResult {
        tool_use_id: message.tool_call_id.clone().unwrap_or_default(),
        content: message.content.clone(),
    }
}

/// Convert a single non-tool message's content.
pub fn convert_content(message: &Message) -> ApiContent {
    if message.has_tool_calls() {
        let mut blocks: Vec<ContentBlock> = vec![];
        if !message.content.is_empty() {
            blocks.push(ContentBlock::Text { text: message.content.clone() });
        }
        for tc in &message.tool_calls {
            blocks.push(ContentBlock::ToolUse {
                id: tc.id.clone(),
                name: tc.name.clone(),
                input: tc.parsed_arguments().unwrap_or_else(|_| serde_json::json!({})),
            });
        }
        return ApiContent::Blocks(blocks);
    }

    ApiContent::Text(message.content.clone())
}

/// Convert tools to Anthropic API format.
pub fn convert_tools(request: &CompletionRequest) -> Vec<ApiTool> {
    request
        .tools
        .iter()
        .map(|t| ApiTool {
            name: t.name.clone(),
            description: t.description.clone(),
            input_schema: t.parameters.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "converter_tests.rs"]
mod tests;
