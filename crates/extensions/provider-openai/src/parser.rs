//! Response parsing utilities.

use pagehands_protocols::error::ProviderError;
use pagehands_protocols::provider::CompletionResponse;
use pagehands_protocols::types::{ToolCall, Usage};

use crate::api::{ApiErrorBody, ApiResponse};

/// Parse API response to the canonical response.
pub fn parse_response(response: ApiResponse) -> Result<CompletionResponse, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
        .collect();

    let usage = response
        .usage
        .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens));

    Ok(CompletionResponse::new(
        choice.message.content.unwrap_or_default(),
        tool_calls,
        usage,
    ))
}

/// Pull the human-readable message out of an error body.
pub fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}
