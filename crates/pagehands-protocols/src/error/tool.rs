//! Tool execution error classes.
//!
//! Tool failures never abort a batch; they are carried inside a
//! [`ToolResult`](crate::tool::ToolResult) so the model can see which
//! actions succeeded.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    ElementNotFound,
    ElementNotVisible,
    ActionExecutionFailed,
    InvalidParameters,
    UnknownTool,
    ExecutorUnreachable,
}

impl std::fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToolErrorKind::ElementNotFound => "element_not_found",
            ToolErrorKind::ElementNotVisible => "element_not_visible",
            ToolErrorKind::ActionExecutionFailed => "action_execution_failed",
            ToolErrorKind::InvalidParameters => "invalid_parameters",
            ToolErrorKind::UnknownTool => "unknown_tool",
            ToolErrorKind::ExecutorUnreachable => "executor_unreachable",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ToolErrorKind::ElementNotVisible).unwrap();
        assert_eq!(json, "\"element_not_visible\"");
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in [
            ToolErrorKind::ElementNotFound,
            ToolErrorKind::ActionExecutionFailed,
            ToolErrorKind::UnknownTool,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"'), kind.to_string());
        }
    }
}
