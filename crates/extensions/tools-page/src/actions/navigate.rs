use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use url::Url;

use pagehands_protocols::tool::{ToolName, ToolResult};

use super::{failed, invalid, parse_params, ActionContext};

#[derive(Debug, Deserialize)]
pub struct NavigateParams {
    #[serde(default)]
    pub url: String,
}

/// Navigate the document. Relative URLs resolve against the current page;
/// success is reported as soon as navigation is issued.
pub fn navigate(ctx: &ActionContext<'_>, params: Value) -> ToolResult {
    const TOOL: ToolName = ToolName::Navigate;
    let params: NavigateParams = match parse_params(TOOL, params) {
        Ok(p) => p,
        Err(result) => return result,
    };
    let raw = params.url.trim();
    if raw.is_empty() {
        return invalid(TOOL, "A URL is required");
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(&ctx.document.url()).and_then(|base| base.join(raw)) {
                Ok(url) => url,
                Err(e) => return invalid(TOOL, format!("Invalid URL '{}': {}", raw, e)),
            }
        }
        Err(e) => return invalid(TOOL, format!("Invalid URL '{}': {}", raw, e)),
    };
    if !matches!(url.scheme(), "http" | "https") {
        return invalid(TOOL, format!("Unsupported URL scheme '{}'", url.scheme()));
    }

    if let Err(e) = ctx.document.navigate(url.as_str()) {
        return failed(TOOL, format!("Navigation failed: {}", e));
    }
    info!("Navigating to {}", url);
    ToolResult::success(TOOL.as_str()).with_data("url", url.as_str())
}
