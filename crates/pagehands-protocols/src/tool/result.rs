//! Tool execution result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolErrorKind;

/// Outcome of one tool call.
///
/// Tool-specific data is flattened into the object, so a click result
/// serializes as `{"success":true,"tool":"click_element","method":"fuzzy",...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub success: bool,

    /// Name of the tool that produced this result.
    pub tool: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_kind: Option<ToolErrorKind>,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ToolResult {
    /// Create a successful result with no extra data.
    pub fn success(tool: impl Into<String>) -> Self {
        Self {
            success: true,
            tool: tool.into(),
            error: None,
            error_kind: None,
            data: Map::new(),
        }
    }

    /// Create a failed result.
    pub fn failure(tool: impl Into<String>, kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            tool: tool.into(),
            error: Some(message.into()),
            error_kind: Some(kind),
            data: Map::new(),
        }
    }

    /// Attach a data field.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Look up a data field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Serialize for a tool-role history message.
    pub fn to_message_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"success":{},"tool":"{}"}}"#, self.success, self.tool)
        })
    }
}
