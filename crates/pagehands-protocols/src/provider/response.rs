//! Canonical completion response.

use serde::{Deserialize, Serialize};

use crate::types::{ToolCall, Usage};

/// Backend-neutral response; every variant produces exactly this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    /// Text content (may be empty when the model only calls tools).
    pub content: String,

    /// Tool calls in the order the model emitted them; `None` when there are none.
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Token usage, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// Create a text-only response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: None,
            usage: None,
        }
    }

    /// Create a response, normalizing an empty call list to `None`.
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>, usage: Option<Usage>) -> Self {
        Self {
            content: content.into(),
            tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
            usage,
        }
    }

    /// Tool calls as a slice (empty when none).
    pub fn calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_empty_calls() {
        let response = CompletionResponse::new("hi", vec![], None);
        assert!(response.tool_calls.is_none());
        assert!(response.calls().is_empty());
    }

    #[test]
    fn test_new_keeps_calls_in_order() {
        let calls = vec![
            ToolCall::new("a", "scroll_page", "{}"),
            ToolCall::new("b", "find_text", "{}"),
        ];
        let response = CompletionResponse::new("", calls, Some(Usage::new(1, 2)));
        let ids: Vec<_> = response.calls().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(CompletionResponse::text("Done")).unwrap();
        assert_eq!(json["content"], "Done");
        assert!(json["toolCalls"].is_null());
        assert!(json.get("usage").is_none());
    }
}
