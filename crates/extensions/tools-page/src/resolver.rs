//! Natural-language element resolution.
//!
//! Strategies run in a fixed order: explicit selector, visible text,
//! accessibility attributes, then fuzzy keyword matching. The first strategy
//! that produces any candidate decides the outcome. If all of its candidates
//! are invisible the element resolves as not visible.

use thiserror::Error;
use tracing::debug;

use pagehands_protocols::error::{DocumentError, ToolErrorKind};
use pagehands_protocols::page::{DocumentHandle, ElementSnapshot};

const ARIA_ATTRIBUTES: [&str; 4] = ["aria-label", "title", "alt", "placeholder"];
const MIN_KEYWORD_LEN: usize = 3;

/// Which elements a description may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveScope {
    /// Buttons, links, inputs and anything with a clickable role.
    Clickable,
    /// Inputs, selects and textareas.
    FormField,
}

impl ResolveScope {
    fn contains(&self, element: &ElementSnapshot) -> bool {
        match self {
            ResolveScope::Clickable => element.is_interactive(),
            ResolveScope::FormField => element.is_form_field(),
        }
    }
}

/// The strategy that resolved an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMethod {
    Selector,
    Text,
    Aria,
    Fuzzy,
}

impl ResolveMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMethod::Selector => "selector",
            ResolveMethod::Text => "text",
            ResolveMethod::Aria => "aria",
            ResolveMethod::Fuzzy => "fuzzy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub element: ElementSnapshot,
    pub method: ResolveMethod,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Could not find an element matching '{0}'")]
    NotFound(String),

    #[error("Element matching '{description}' is not visible")]
    NotVisible {
        description: String,
        method: ResolveMethod,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            ResolveError::NotFound(_) => ToolErrorKind::ElementNotFound,
            ResolveError::NotVisible { .. } => ToolErrorKind::ElementNotVisible,
        }
    }
}

pub struct ElementResolver<'a> {
    document: &'a dyn DocumentHandle,
}

impl<'a> ElementResolver<'a> {
    pub fn new(document: &'a dyn DocumentHandle) -> Self {
        Self { document }
    }

    pub fn resolve(
        &self,
        description: &str,
        selector: Option<&str>,
        scope: ResolveScope,
    ) -> Result<Resolved, ResolveError> {
        let description = description.trim();
        let label = if description.is_empty() {
            selector.unwrap_or_default()
        } else {
            description
        };

        if let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) {
            let candidates = self.by_selector(selector);
            if !candidates.is_empty() {
                return pick(candidates, ResolveMethod::Selector, label);
            }
        }
        if description.is_empty() {
            return Err(ResolveError::NotFound(label.to_string()));
        }

        let elements = self.document.elements();
        let needle = description.to_lowercase();

        // Exact-case matches outrank case-insensitive ones.
        let text_matches = |matches: &dyn Fn(&str) -> bool| -> Vec<ElementSnapshot> {
            elements
                .iter()
                .filter(|e| scope.contains(e) && text_for(e, scope).is_some_and(matches))
                .cloned()
                .collect()
        };
        let mut by_text = text_matches(&|t: &str| t.contains(description));
        if by_text.is_empty() {
            by_text = text_matches(&|t: &str| t.to_lowercase().contains(&needle));
        }
        if !by_text.is_empty() {
            return pick(by_text, ResolveMethod::Text, label);
        }

        let by_aria: Vec<ElementSnapshot> = elements
            .iter()
            .filter(|e| scope == ResolveScope::Clickable || e.is_form_field())
            .filter(|e| {
                ARIA_ATTRIBUTES
                    .iter()
                    .any(|a| e.attr(a).is_some_and(|v| v.to_lowercase().contains(&needle)))
            })
            .cloned()
            .collect();
        if !by_aria.is_empty() {
            return pick(by_aria, ResolveMethod::Aria, label);
        }

        match fuzzy_best(&elements, &keywords(description), scope) {
            Some(element) => Ok(Resolved {
                element: element.clone(),
                method: ResolveMethod::Fuzzy,
            }),
            None => Err(ResolveError::NotFound(label.to_string())),
        }
    }

    fn by_selector(&self, selector: &str) -> Vec<ElementSnapshot> {
        match self.document.query(selector) {
            Ok(found) => found,
            Err(DocumentError::InvalidSelector(s)) => {
                debug!("Ignoring invalid selector '{}'", s);
                Vec::new()
            }
            Err(e) => {
                debug!("Selector query failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn pick(candidates: Vec<ElementSnapshot>, method: ResolveMethod, description: &str) -> Result<Resolved, ResolveError> {
    match candidates.into_iter().find(|e| e.visible) {
        Some(element) => Ok(Resolved { element, method }),
        None => Err(ResolveError::NotVisible {
            description: description.to_string(),
            method,
        }),
    }
}

/// Text the text strategy compares against.
fn text_for(element: &ElementSnapshot, scope: ResolveScope) -> Option<&str> {
    match scope {
        ResolveScope::Clickable => Some(element.text.as_str()).filter(|t| !t.is_empty()),
        ResolveScope::FormField => element.label.as_deref(),
    }
}

/// Lowercase words of at least three characters.
pub fn keywords(description: &str) -> Vec<String> {
    description
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_string)
        .collect()
}

fn haystack(element: &ElementSnapshot) -> String {
    let mut parts: Vec<&str> = vec![element.text.as_str()];
    parts.extend(element.value.as_deref());
    parts.extend(element.label.as_deref());
    parts.join(" ").to_lowercase()
}

/// First visible in-scope element, in document order, whose text, value or
/// label contains any keyword.
fn fuzzy_best<'e>(
    elements: &'e [ElementSnapshot],
    keywords: &[String],
    scope: ResolveScope,
) -> Option<&'e ElementSnapshot> {
    if keywords.is_empty() {
        return None;
    }
    elements.iter().filter(|e| e.visible && scope.contains(e)).find(|e| {
        let haystack = haystack(e);
        keywords.iter().any(|k| haystack.contains(k.as_str()))
    })
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
