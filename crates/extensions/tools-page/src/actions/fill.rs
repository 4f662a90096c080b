use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use pagehands_protocols::page::{DomEvent, ElementSnapshot};
use pagehands_protocols::tool::{ToolName, ToolResult};

use super::{element_json, failed, invalid, parse_params, ActionContext};
use crate::resolver::{ElementResolver, ResolveScope};

#[derive(Debug, Deserialize)]
pub struct FillParams {
    #[serde(default, alias = "description", alias = "field")]
    pub field_description: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub selector: Option<String>,
}

pub async fn fill_form(ctx: &ActionContext<'_>, params: Value) -> ToolResult {
    const TOOL: ToolName = ToolName::FillForm;
    let params: FillParams = match parse_params(TOOL, params) {
        Ok(p) => p,
        Err(result) => return result,
    };
    let value = match &params.value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return invalid(TOOL, "A string value is required"),
    };
    if params.field_description.trim().is_empty() && params.selector.is_none() {
        return invalid(TOOL, "A field description or selector is required");
    }

    let resolved = match ElementResolver::new(ctx.document).resolve(
        &params.field_description,
        params.selector.as_deref(),
        ResolveScope::FormField,
    ) {
        Ok(resolved) => resolved,
        Err(e) => return ToolResult::failure(TOOL.as_str(), e.kind(), e.to_string()),
    };
    let field = &resolved.element;

    if let Err(e) = ctx.present(field.id).await {
        return failed(TOOL, format!("Fill failed: {}", e));
    }

    let applied = if field.tag == "select" {
        let Some(option) = matching_option(field, &value) else {
            return failed(TOOL, format!("No option matching '{}'", value));
        };
        let result = ctx
            .document
            .select_option(field.id, &option)
            .and_then(|_| ctx.document.dispatch_event(field.id, DomEvent::Change));
        if let Err(e) = result {
            return failed(TOOL, format!("Fill failed: {}", e));
        }
        option
    } else {
        let result = ctx
            .document
            .set_value(field.id, &value)
            .and_then(|_| ctx.document.dispatch_event(field.id, DomEvent::Input))
            .and_then(|_| ctx.document.dispatch_event(field.id, DomEvent::Change));
        if let Err(e) = result {
            return failed(TOOL, format!("Fill failed: {}", e));
        }
        value
    };

    info!(method = resolved.method.as_str(), "Filled <{}> field", field.tag);
    ToolResult::success(TOOL.as_str())
        .with_data("method", resolved.method.as_str())
        .with_data("element", element_json(field))
        .with_data("value", applied)
}

/// Value of the first option whose text or value equals `wanted`, ignoring case.
fn matching_option(select: &ElementSnapshot, wanted: &str) -> Option<String> {
    let wanted = wanted.trim().to_lowercase();
    select
        .options
        .iter()
        .find(|o| o.text.trim().to_lowercase() == wanted || o.value.to_lowercase() == wanted)
        .map(|o| o.value.clone())
}
