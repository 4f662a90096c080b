//! The static catalogue of page automation tools.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ToolDefinition;

/// Names of the built-in tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    ClickElement,
    FillForm,
    ScrollPage,
    FindText,
    ExtractData,
    Navigate,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::ClickElement,
        ToolName::FillForm,
        ToolName::ScrollPage,
        ToolName::FindText,
        ToolName::ExtractData,
        ToolName::Navigate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ClickElement => "click_element",
            ToolName::FillForm => "fill_form",
            ToolName::ScrollPage => "scroll_page",
            ToolName::FindText => "find_text",
            ToolName::ExtractData => "extract_data",
            ToolName::Navigate => "navigate",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

/// Catalogue of tool definitions offered to the model.
///
/// Pure data; the same definitions go to every provider, which only reshapes
/// them at submission time.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// The six built-in page tools.
    pub fn builtin() -> &'static ToolRegistry {
        static REGISTRY: OnceLock<ToolRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| ToolRegistry {
            definitions: ToolName::ALL.iter().map(|name| definition_for(*name)).collect(),
        })
    }

    /// List all tool definitions, in catalogue order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Get a tool definition by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn definition_for(name: ToolName) -> ToolDefinition {
    match name {
        ToolName::ClickElement => ToolDefinition::new(
            name.as_str(),
            "Click an element on the page. Describe the element in natural language \
             (e.g. \"submit button\", \"Sign in link\"); optionally pass a CSS selector if known.",
            json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "Natural language description of the element to click"
                    },
                    "selector": {
                        "type": "string",
                        "description": "Optional CSS selector for the element"
                    }
                },
                "required": ["description"]
            }),
        ),
        ToolName::FillForm => ToolDefinition::new(
            name.as_str(),
            "Fill a form field with a value. Works for text inputs, textareas and select boxes.",
            json!({
                "type": "object",
                "properties": {
                    "field_description": {
                        "type": "string",
                        "description": "Natural language description of the field (label, placeholder or name)"
                    },
                    "value": {
                        "type": "string",
                        "description": "Value to enter or option to select"
                    },
                    "selector": {
                        "type": "string",
                        "description": "Optional CSS selector for the field"
                    }
                },
                "required": ["field_description", "value"]
            }),
        ),
        ToolName::ScrollPage => ToolDefinition::new(
            name.as_str(),
            "Scroll the page up, down, or to the top or bottom.",
            json!({
                "type": "object",
                "properties": {
                    "direction": {
                        "type": "string",
                        "enum": ["up", "down", "top", "bottom"],
                        "description": "Direction to scroll"
                    },
                    "amount": {
                        "type": "number",
                        "description": "Pixels to scroll for up/down (default 500)"
                    }
                },
                "required": ["direction"]
            }),
        ),
        ToolName::FindText => ToolDefinition::new(
            name.as_str(),
            "Find and highlight text on the page, scrolling to the first match.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Text to search for"
                    },
                    "case_sensitive": {
                        "type": "boolean",
                        "description": "Whether the search is case sensitive (default false)"
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolName::ExtractData => ToolDefinition::new(
            name.as_str(),
            "Extract structured data from the page. The schema maps output field names to \
             {selector, attribute, multiple, transform}.",
            json!({
                "type": "object",
                "properties": {
                    "schema": {
                        "type": "object",
                        "description": "Map of field name to extraction rule",
                        "additionalProperties": {
                            "type": "object",
                            "properties": {
                                "selector": {
                                    "type": "string",
                                    "description": "CSS selector of the element(s)"
                                },
                                "attribute": {
                                    "type": "string",
                                    "description": "text, html, href, src, value, or any attribute name (default text)"
                                },
                                "multiple": {
                                    "type": "boolean",
                                    "description": "Return every match as an array (default false)"
                                },
                                "transform": {
                                    "type": "string",
                                    "enum": ["number", "date", "trim"],
                                    "description": "Optional value transform"
                                }
                            },
                            "required": ["selector"]
                        }
                    }
                },
                "required": ["schema"]
            }),
        ),
        ToolName::Navigate => ToolDefinition::new(
            name.as_str(),
            "Navigate the current tab to a URL.",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Absolute URL to open"
                    }
                },
                "required": ["url"]
            }),
        ),
    }
}

#[cfg(test)]
#[path = "catalogue_tests.rs"]
mod tests;
