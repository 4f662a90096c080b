use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use pagehands_protocols::page::ElementSnapshot;
use pagehands_protocols::tool::{ToolName, ToolResult};

use super::{invalid, ActionContext};

const DATE_FORMATS: [&str; 7] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// How one output field is read from the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractRule {
    pub selector: String,
    #[serde(default = "default_attribute")]
    pub attribute: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub transform: Option<Transform>,
}

fn default_attribute() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    Number,
    Date,
    Trim,
}

impl ExtractRule {
    /// A bare string is shorthand for `{selector}`.
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(selector) => Ok(Self {
                selector: selector.clone(),
                attribute: default_attribute(),
                multiple: false,
                transform: None,
            }),
            Value::Object(_) => {
                serde_json::from_value(value.clone()).map_err(|e| format!("Invalid extraction rule: {}", e))
            }
            _ => Err("Invalid extraction rule: expected an object or selector string".to_string()),
        }
    }
}

/// Declarative extraction. Fields that fail carry `{"error": ...}` in place
/// of a value; the call as a whole still succeeds.
pub fn extract_data(ctx: &ActionContext<'_>, params: Value) -> ToolResult {
    const TOOL: ToolName = ToolName::ExtractData;
    let schema = match params.get("schema") {
        Some(Value::Object(schema)) => schema.clone(),
        _ => return invalid(TOOL, "Schema must be an object mapping field names to rules"),
    };

    let mut data = Map::new();
    let mut failures = 0;
    for (field, rule) in &schema {
        let value = match ExtractRule::from_value(rule).and_then(|rule| extract_field(ctx, &rule)) {
            Ok(value) => value,
            Err(message) => {
                failures += 1;
                json!({ "error": message })
            }
        };
        data.insert(field.clone(), value);
    }

    debug!(fields = schema.len(), failures, "Extraction complete");
    ToolResult::success(TOOL.as_str()).with_data("data", Value::Object(data))
}

fn extract_field(ctx: &ActionContext<'_>, rule: &ExtractRule) -> Result<Value, String> {
    let elements = ctx.document.query(&rule.selector).map_err(|e| e.to_string())?;

    if rule.multiple {
        let values = elements
            .iter()
            .map(|element| {
                read_attribute(ctx, element, &rule.attribute)
                    .and_then(|raw| apply_transform(&raw, rule.transform))
                    .unwrap_or(Value::Null)
            })
            .collect();
        return Ok(Value::Array(values));
    }

    let element = elements
        .first()
        .ok_or_else(|| format!("No element matches '{}'", rule.selector))?;
    let raw = read_attribute(ctx, element, &rule.attribute)?;
    apply_transform(&raw, rule.transform)
}

fn read_attribute(ctx: &ActionContext<'_>, element: &ElementSnapshot, attribute: &str) -> Result<String, String> {
    match attribute {
        "text" => Ok(element.text.clone()),
        "html" => ctx.document.inner_html(element.id).map_err(|e| e.to_string()),
        "value" => element
            .value
            .clone()
            .or_else(|| element.attr("value").map(str::to_string))
            .ok_or_else(|| format!("<{}> has no value", element.tag)),
        name => element
            .attr(name)
            .map(str::to_string)
            .ok_or_else(|| format!("<{}> has no '{}' attribute", element.tag, name)),
    }
}

pub(crate) fn apply_transform(raw: &str, transform: Option<Transform>) -> Result<Value, String> {
    match transform {
        None => Ok(Value::String(raw.to_string())),
        Some(Transform::Trim) => Ok(Value::String(raw.split_whitespace().collect::<Vec<_>>().join(" "))),
        Some(Transform::Number) => parse_number(raw),
        Some(Transform::Date) => parse_date(raw).map(Value::String),
    }
}

fn parse_number(raw: &str) -> Result<Value, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let number: f64 = cleaned
        .parse()
        .map_err(|_| format!("Could not parse '{}' as a number", raw.trim()))?;
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        return Ok(json!(number as i64));
    }
    Ok(json!(number))
}

fn parse_date(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.to_rfc3339());
    }
    if let Some(parsed) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Ok(parsed.format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| format!("Could not parse '{}' as a date", raw))
}
