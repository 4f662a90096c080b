//! Page tool implementations.
//!
//! Every action returns a [`ToolResult`]; failures are reported in the result
//! rather than as errors so a batch of tool calls always completes.

mod click;
mod extract;
mod fill;
mod find;
mod navigate;
mod scroll;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use pagehands_config::ExecutorConfig;
use pagehands_protocols::error::{DocumentError, ToolErrorKind};
use pagehands_protocols::page::{DocumentHandle, ElementSnapshot, NodeId};
use pagehands_protocols::tool::{ToolName, ToolResult};

pub use click::{click_element, ClickParams};
pub use extract::{extract_data, ExtractRule, Transform};
pub use fill::{fill_form, FillParams};
pub use find::{find_text, FindParams};
pub use navigate::{navigate, NavigateParams};
pub use scroll::{scroll_page, ScrollDirection, ScrollParams};

const ELEMENT_TEXT_LIMIT: usize = 100;

/// Document and settings shared by the actions of one executor.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub document: &'a dyn DocumentHandle,
    pub settings: &'a ExecutorConfig,
}

impl<'a> ActionContext<'a> {
    pub fn new(document: &'a dyn DocumentHandle, settings: &'a ExecutorConfig) -> Self {
        Self { document, settings }
    }

    /// Bring the element into view, highlight it and let the page settle.
    pub async fn present(&self, id: NodeId) -> Result<(), DocumentError> {
        self.document.scroll_into_view(id)?;
        self.document
            .highlight(id, Duration::from_millis(self.settings.highlight_ms))?;
        tokio::time::sleep(Duration::from_millis(self.settings.settle_delay_ms)).await;
        Ok(())
    }
}

/// Run a built-in tool.
pub async fn run(ctx: &ActionContext<'_>, tool: ToolName, params: Value) -> ToolResult {
    match tool {
        ToolName::ClickElement => click_element(ctx, params).await,
        ToolName::FillForm => fill_form(ctx, params).await,
        ToolName::ScrollPage => scroll_page(ctx, params),
        ToolName::FindText => find_text(ctx, params),
        ToolName::ExtractData => extract_data(ctx, params),
        ToolName::Navigate => navigate(ctx, params),
    }
}

pub(crate) fn parse_params<T: DeserializeOwned>(tool: ToolName, params: Value) -> Result<T, ToolResult> {
    let params = if params.is_null() {
        Value::Object(Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| {
        ToolResult::failure(
            tool.as_str(),
            ToolErrorKind::InvalidParameters,
            format!("Invalid parameters: {}", e),
        )
    })
}

pub(crate) fn invalid(tool: ToolName, message: impl Into<String>) -> ToolResult {
    ToolResult::failure(tool.as_str(), ToolErrorKind::InvalidParameters, message)
}

pub(crate) fn failed(tool: ToolName, message: impl Into<String>) -> ToolResult {
    ToolResult::failure(tool.as_str(), ToolErrorKind::ActionExecutionFailed, message)
}

/// Compact description of an element for tool results.
pub(crate) fn element_json(element: &ElementSnapshot) -> Value {
    let text = match element.text.char_indices().nth(ELEMENT_TEXT_LIMIT) {
        Some((idx, _)) => &element.text[..idx],
        None => element.text.as_str(),
    };
    let mut value = json!({
        "tag": element.tag,
        "text": text,
    });
    for name in ["id", "name", "type"] {
        if let Some(attr) = element.attr(name) {
            value[name] = json!(attr);
        }
    }
    value
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
