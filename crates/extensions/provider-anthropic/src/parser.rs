//! Response parsing utilities.

use pagehands_protocols::provider::CompletionResponse;
use pagehands_protocols::types::{ToolCall, Usage};

use crate::api::{ApiErrorBody, ApiResponse, ContentBlock};

/// Parse API response to the canonical response.
///
/// Text blocks are joined; `tool_use` inputs are re-serialized to JSON strings.
pub fn parse_response(response: ApiResponse) -> CompletionResponse {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    for block in response.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(&t),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall::new(id, name, input.to_string()));
            }
            _ => {}
        }
    }

    let usage = response
        .usage
        .map(|u| Usage::new(u.input_tokens, u.output_tokens));

    CompletionResponse::new(text, tool_calls, usage)
}

/// Pull the human-readable message out of an error body.
pub fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}
