use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use pagehands_protocols::tool::{ToolName, ToolResult};

use super::{invalid, parse_params, ActionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Top,
    Bottom,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
            ScrollDirection::Top => "top",
            ScrollDirection::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrollParams {
    pub direction: ScrollDirection,
    #[serde(default)]
    pub amount: Option<f64>,
}

pub fn scroll_page(ctx: &ActionContext<'_>, params: Value) -> ToolResult {
    const TOOL: ToolName = ToolName::ScrollPage;
    let params: ScrollParams = match parse_params(TOOL, params) {
        Ok(p) => p,
        Err(result) => return result,
    };
    let amount = params.amount.unwrap_or(ctx.settings.scroll_amount);
    if !amount.is_finite() || amount <= 0.0 {
        return invalid(TOOL, "Scroll amount must be a positive number");
    }

    let document = ctx.document;
    match params.direction {
        ScrollDirection::Up => document.scroll_by(0.0, -amount),
        ScrollDirection::Down => document.scroll_by(0.0, amount),
        ScrollDirection::Top => document.scroll_to(0.0, 0.0),
        ScrollDirection::Bottom => document.scroll_to(0.0, document.scroll_height()),
    }

    let position = document.scroll_position();
    debug!(direction = params.direction.as_str(), y = position.y, "Scrolled page");
    ToolResult::success(TOOL.as_str())
        .with_data("direction", params.direction.as_str())
        .with_data("position", json!({"x": position.x, "y": position.y}))
}
