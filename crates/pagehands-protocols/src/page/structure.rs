//! Structural page snapshot.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::PageContext;

/// Maximum number of characters of body text kept in a snapshot.
pub const BODY_TEXT_LIMIT: usize = 5000;

/// Read-only snapshot of a document's structure. Never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStructure {
    pub url: String,
    pub title: String,
    pub meta: BTreeMap<String, String>,
    pub interactive: InteractiveSummary,
    pub forms: Vec<FormSummary>,
    pub headings: Vec<Heading>,
    pub navigation: Vec<NavigationRegion>,
    pub body_text: String,
}

impl PageStructure {
    /// Derive the prompt context for this snapshot.
    pub fn to_context(&self) -> PageContext {
        PageContext {
            url: self.url.clone(),
            title: self.title.clone(),
            timestamp: Some(Utc::now()),
            headings: self.headings.iter().map(|h| h.text.clone()).collect(),
            description: self.meta.get("description").cloned(),
            interactive_count: self.interactive.elements.len(),
            form_count: self.forms.len(),
        }
    }
}

/// Counts and short descriptions of interactive elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveSummary {
    pub counts: InteractiveCounts,
    pub elements: Vec<ElementSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveCounts {
    pub buttons: usize,
    pub links: usize,
    pub inputs: usize,
    pub selects: usize,
    pub textareas: usize,
}

/// Identifying facts about one element, as reported back to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default, rename = "type")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<String>,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none", default, rename = "type")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationRegion {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    pub links: Vec<NavigationLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLink {
    pub text: String,
    pub href: String,
}

/// Truncate to at most [`BODY_TEXT_LIMIT`] characters on a char boundary.
pub fn truncate_body_text(text: &str) -> String {
    match text.char_indices().nth(BODY_TEXT_LIMIT) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
