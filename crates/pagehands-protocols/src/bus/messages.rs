//! Bus message types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::page::PageContext;

/// A direct tool invocation that bypasses the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    pub tool: String,
    #[serde(default)]
    pub params: Value,
}

impl ActionData {
    pub fn new(tool: impl Into<String>, params: Value) -> Self {
        Self {
            tool: tool.into(),
            params,
        }
    }
}

/// Requests accepted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OrchestratorRequest {
    Chat {
        message: String,
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
        #[serde(default)]
        page_context: Option<PageContext>,
    },
    AnalyzePage {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
    },
    Summarize {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
        #[serde(default)]
        page_context: Option<PageContext>,
    },
    ExtractData {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
        schema: Value,
        #[serde(default)]
        page_context: Option<PageContext>,
    },
    GetPageStructure {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
    },
    ExecuteAction {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
        action_data: ActionData,
    },
    GetConfig,
    SetConfig {
        config: Value,
    },
    ClearHistory {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
    },
    GetHistory {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
    },
    TabClosed {
        #[serde(deserialize_with = "tab_id")]
        tab_id: String,
    },
}

impl OrchestratorRequest {
    pub fn action(&self) -> &'static str {
        match self {
            OrchestratorRequest::Chat { .. } => "chat",
            OrchestratorRequest::AnalyzePage { .. } => "analyze_page",
            OrchestratorRequest::Summarize { .. } => "summarize",
            OrchestratorRequest::ExtractData { .. } => "extract_data",
            OrchestratorRequest::GetPageStructure { .. } => "get_page_structure",
            OrchestratorRequest::ExecuteAction { .. } => "execute_action",
            OrchestratorRequest::GetConfig => "get_config",
            OrchestratorRequest::SetConfig { .. } => "set_config",
            OrchestratorRequest::ClearHistory { .. } => "clear_history",
            OrchestratorRequest::GetHistory { .. } => "get_history",
            OrchestratorRequest::TabClosed { .. } => "tab_closed",
        }
    }

    /// The tab this request is about, if any.
    pub fn tab_id(&self) -> Option<&str> {
        match self {
            OrchestratorRequest::Chat { tab_id, .. }
            | OrchestratorRequest::AnalyzePage { tab_id }
            | OrchestratorRequest::Summarize { tab_id, .. }
            | OrchestratorRequest::ExtractData { tab_id, .. }
            | OrchestratorRequest::GetPageStructure { tab_id }
            | OrchestratorRequest::ExecuteAction { tab_id, .. }
            | OrchestratorRequest::ClearHistory { tab_id }
            | OrchestratorRequest::GetHistory { tab_id }
            | OrchestratorRequest::TabClosed { tab_id } => Some(tab_id),
            OrchestratorRequest::GetConfig | OrchestratorRequest::SetConfig { .. } => None,
        }
    }
}

/// Requests accepted by the page executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ExecutorRequest {
    GetStructure,
    ExecuteTool {
        tool: String,
        #[serde(default)]
        params: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
    },
    ExecuteAction {
        data: ActionData,
    },
    Highlight {
        selector: String,
    },
    ScrollTo {
        selector: String,
    },
    GetSelection,
}

impl ExecutorRequest {
    pub fn action(&self) -> &'static str {
        match self {
            ExecutorRequest::GetStructure => "get_structure",
            ExecutorRequest::ExecuteTool { .. } => "execute_tool",
            ExecutorRequest::ExecuteAction { .. } => "execute_action",
            ExecutorRequest::Highlight { .. } => "highlight",
            ExecutorRequest::ScrollTo { .. } => "scroll_to",
            ExecutorRequest::GetSelection => "get_selection",
        }
    }
}

/// Accept tab ids sent as either strings or numbers.
fn tab_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
