//! Page structure snapshot.

use tracing::{debug, warn};

use pagehands_protocols::page::{
    truncate_body_text, DocumentHandle, ElementSnapshot, ElementSummary, FormField, FormSummary, Heading,
    InteractiveCounts, InteractiveSummary, NavigationLink, NavigationRegion, PageStructure,
};

/// Interactive elements listed individually; the counts cover the rest.
pub const MAX_INTERACTIVE: usize = 50;
const SUMMARY_TEXT_LIMIT: usize = 100;

/// Snapshot the document for the model and the host.
pub fn page_structure(document: &dyn DocumentHandle) -> PageStructure {
    let elements = document.elements();

    let structure = PageStructure {
        url: document.url(),
        title: document.title(),
        meta: document.meta(),
        interactive: interactive(&elements),
        forms: forms(document, &elements),
        headings: headings(&elements),
        navigation: navigation(document, &elements),
        body_text: truncate_body_text(&document.body_text()),
    };
    debug!(
        interactive = structure.interactive.elements.len(),
        forms = structure.forms.len(),
        "Captured page structure"
    );
    structure
}

fn interactive(elements: &[ElementSnapshot]) -> InteractiveSummary {
    let mut counts = InteractiveCounts::default();
    for element in elements {
        match element.tag.as_str() {
            "button" => counts.buttons += 1,
            "a" if element.attributes.contains_key("href") => counts.links += 1,
            "input" if !is_hidden_input(element) => counts.inputs += 1,
            "select" => counts.selects += 1,
            "textarea" => counts.textareas += 1,
            _ => {}
        }
    }

    let elements = elements
        .iter()
        .filter(|e| e.visible && e.is_interactive())
        .take(MAX_INTERACTIVE)
        .map(summarize)
        .collect();
    InteractiveSummary { counts, elements }
}

fn summarize(element: &ElementSnapshot) -> ElementSummary {
    ElementSummary {
        tag: element.tag.clone(),
        id: element.attr("id").map(str::to_string),
        name: element.attr("name").map(str::to_string),
        kind: element.attr("type").map(str::to_string),
        text: truncate(&element.text, SUMMARY_TEXT_LIMIT),
        selector: selector_for(element),
    }
}

/// A selector that re-finds the element, when one is cheap to build.
pub fn selector_for(element: &ElementSnapshot) -> Option<String> {
    if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
        return Some(format!("#{}", id));
    }
    element
        .attr("name")
        .filter(|name| !name.is_empty())
        .map(|name| format!("{}[name=\"{}\"]", element.tag, name))
}

fn forms(document: &dyn DocumentHandle, elements: &[ElementSnapshot]) -> Vec<FormSummary> {
    elements
        .iter()
        .filter(|e| e.tag == "form")
        .map(|form| {
            let fields = match document.query_within(form.id, "input, select, textarea") {
                Ok(fields) => fields,
                Err(e) => {
                    warn!("Could not read fields of form {}: {}", form.id, e);
                    Vec::new()
                }
            };
            FormSummary {
                id: form.attr("id").map(str::to_string),
                action: form.attr("action").map(str::to_string),
                method: form.attr("method").map(str::to_lowercase),
                fields: fields
                    .iter()
                    .filter(|f| !is_hidden_input(f))
                    .map(|f| FormField {
                        tag: f.tag.clone(),
                        kind: f.attr("type").map(str::to_string),
                        name: f.attr("name").map(str::to_string),
                        label: f.label.clone(),
                        placeholder: f.attr("placeholder").map(str::to_string),
                        required: f.attributes.contains_key("required"),
                    })
                    .collect(),
            }
        })
        .collect()
}

fn headings(elements: &[ElementSnapshot]) -> Vec<Heading> {
    elements
        .iter()
        .filter(|e| e.visible && !e.text.is_empty())
        .filter_map(|e| {
            let level = e.tag.strip_prefix('h')?.parse::<u8>().ok()?;
            (1..=6).contains(&level).then(|| Heading {
                level,
                text: e.text.clone(),
            })
        })
        .collect()
}

fn navigation(document: &dyn DocumentHandle, elements: &[ElementSnapshot]) -> Vec<NavigationRegion> {
    elements
        .iter()
        .filter(|e| e.visible && (e.tag == "nav" || e.attr("role") == Some("navigation")))
        .map(|region| {
            let links = document
                .query_within(region.id, "a[href]")
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| {
                    Some(NavigationLink {
                        href: a.attr("href")?.to_string(),
                        text: a.text,
                    })
                })
                .collect();
            NavigationRegion {
                label: region.attr("aria-label").map(str::to_string),
                links,
            }
        })
        .collect()
}

fn is_hidden_input(element: &ElementSnapshot) -> bool {
    element.tag == "input" && element.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
#[path = "structure_tests.rs"]
mod tests;
