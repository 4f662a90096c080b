use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use pagehands_protocols::tool::{ToolName, ToolResult};

use super::{element_json, failed, invalid, parse_params, ActionContext};
use crate::resolver::{ElementResolver, ResolveScope};

#[derive(Debug, Deserialize)]
pub struct ClickParams {
    /// Natural language description of the element.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub selector: Option<String>,
}

pub async fn click_element(ctx: &ActionContext<'_>, params: Value) -> ToolResult {
    const TOOL: ToolName = ToolName::ClickElement;
    let params: ClickParams = match parse_params(TOOL, params) {
        Ok(p) => p,
        Err(result) => return result,
    };
    if params.description.trim().is_empty() && params.selector.is_none() {
        return invalid(TOOL, "A description or selector is required");
    }

    let resolved = match ElementResolver::new(ctx.document).resolve(
        &params.description,
        params.selector.as_deref(),
        ResolveScope::Clickable,
    ) {
        Ok(resolved) => resolved,
        Err(e) => return ToolResult::failure(TOOL.as_str(), e.kind(), e.to_string()),
    };

    let id = resolved.element.id;
    if let Err(e) = ctx.present(id).await {
        return failed(TOOL, format!("Click failed: {}", e));
    }
    if let Err(e) = ctx.document.click(id) {
        return failed(TOOL, format!("Click failed: {}", e));
    }

    info!(
        method = resolved.method.as_str(),
        "Clicked <{}> '{}'",
        resolved.element.tag,
        resolved.element.text
    );
    ToolResult::success(TOOL.as_str())
        .with_data("method", resolved.method.as_str())
        .with_data("element", element_json(&resolved.element))
}
