//! Host document access.
//!
//! The embedding environment supplies a [`DocumentHandle`] for the loaded
//! document. Queries return owned snapshots; mutations address nodes by
//! [`NodeId`]. A node id stays valid until the node is removed.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Stable identifier of a node in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point-in-time view of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub id: NodeId,
    /// Lowercase tag name.
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Text of the element's direct text children only.
    pub own_text: String,
    /// Rendered text of the element and its descendants.
    pub text: String,
    pub visible: bool,
    /// Current value for form controls.
    pub value: Option<String>,
    /// Text of an associated `<label>`, if any.
    pub label: Option<String>,
    /// Options, for `select` elements.
    pub options: Vec<SelectOption>,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_form_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    /// Buttons, links, form controls and anything carrying a clickable role.
    pub fn is_interactive(&self) -> bool {
        matches!(self.tag.as_str(), "a" | "button" | "input" | "select" | "textarea")
            || matches!(self.attr("role"), Some("button" | "link" | "checkbox" | "menuitem" | "tab"))
            || self.attributes.contains_key("onclick")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
        }
    }
}

/// A text node and where it sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNodeSnapshot {
    pub id: NodeId,
    /// Lowercase tag names from the parent up to the root.
    pub ancestor_tags: Vec<String>,
    pub text: String,
    pub visible: bool,
}

/// Events the executor fires on form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Input,
    Change,
    Focus,
    Blur,
}

impl DomEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::Focus => "focus",
            DomEvent::Blur => "blur",
        }
    }
}

/// Scroll offset of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

/// Access to the loaded document supplied by the host.
pub trait DocumentHandle: Send + Sync {
    fn url(&self) -> String;

    fn title(&self) -> String;

    /// `<meta>` name/property to content.
    fn meta(&self) -> BTreeMap<String, String>;

    /// Elements matching a CSS selector, in document order.
    fn query(&self, selector: &str) -> Result<Vec<ElementSnapshot>, DocumentError>;

    /// Descendants of `scope` matching a CSS selector.
    fn query_within(&self, scope: NodeId, selector: &str)
        -> Result<Vec<ElementSnapshot>, DocumentError>;

    /// Every element, in document order.
    fn elements(&self) -> Vec<ElementSnapshot>;

    fn element(&self, id: NodeId) -> Option<ElementSnapshot>;

    /// Every text node, in document order.
    fn text_nodes(&self) -> Vec<TextNodeSnapshot>;

    /// Rendered text of the body.
    fn body_text(&self) -> String;

    fn inner_html(&self, id: NodeId) -> Result<String, DocumentError>;

    /// Scroll so the element sits in the center of the viewport.
    fn scroll_into_view(&self, id: NodeId) -> Result<(), DocumentError>;

    /// Apply a temporary visual highlight.
    fn highlight(&self, id: NodeId, duration: Duration) -> Result<(), DocumentError>;

    fn dispatch_event(&self, id: NodeId, event: DomEvent) -> Result<(), DocumentError>;

    fn click(&self, id: NodeId) -> Result<(), DocumentError>;

    fn set_value(&self, id: NodeId, value: &str) -> Result<(), DocumentError>;

    /// Select the option with the given value on a `select` element.
    fn select_option(&self, id: NodeId, value: &str) -> Result<(), DocumentError>;

    /// Wrap byte ranges of a text node in highlight marks; returns the mark ids.
    fn mark_text(&self, node: NodeId, ranges: &[(usize, usize)]) -> Result<Vec<NodeId>, DocumentError>;

    /// Remove every highlight mark, restoring the original text; returns how many were removed.
    fn clear_marks(&self) -> usize;

    fn scroll_position(&self) -> ScrollPosition;

    /// Total scrollable height.
    fn scroll_height(&self) -> f64;

    fn scroll_by(&self, dx: f64, dy: f64);

    fn scroll_to(&self, x: f64, y: f64);

    /// Begin navigating to `url`. Returns once the navigation is issued.
    fn navigate(&self, url: &str) -> Result<(), DocumentError>;

    /// Currently selected text, if any.
    fn selection(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementSnapshot {
        ElementSnapshot {
            tag: tag.to_string(),
            attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_interactive() {
        assert!(element("button", &[]).is_interactive());
        assert!(element("div", &[("role", "button")]).is_interactive());
        assert!(element("span", &[("onclick", "go()")]).is_interactive());
        assert!(!element("div", &[]).is_interactive());
    }

    #[test]
    fn test_is_form_field() {
        assert!(element("textarea", &[]).is_form_field());
        assert!(!element("button", &[]).is_form_field());
    }

    #[test]
    fn test_dom_event_names() {
        assert_eq!(DomEvent::Input.as_str(), "input");
        assert_eq!(serde_json::to_string(&DomEvent::Change).unwrap(), "\"change\"");
    }
}
