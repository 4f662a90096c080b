//! System prompt construction.

use pagehands_protocols::page::{PageContext, PageStructure};
use pagehands_protocols::tool::ToolRegistry;

const BASE_PROMPT: &str = "You are PageHands, an assistant that helps the user understand and operate the web page they are looking at. \
Answer questions about the page concisely. When the user asks you to act on the page, use the available tools; \
describe elements the way they appear to the user, and only pass a CSS selector when you are certain of it.";

const NO_TOOLS_PROMPT: &str = "You cannot act on the page directly. When the user asks for an action, \
explain the steps they should take instead.";

const MAX_PROMPT_HEADINGS: usize = 10;

/// Builder for the per-turn system prompt.
///
/// The prompt is rebuilt for every turn from the page context that arrived
/// with the request, so a navigation is reflected on the next turn.
#[derive(Debug, Default)]
pub struct ContextBuilder<'a> {
    page_context: Option<&'a PageContext>,
    tools_available: bool,
}

impl<'a> ContextBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_context(mut self, context: Option<&'a PageContext>) -> Self {
        self.page_context = context;
        self
    }

    /// Whether the model will be offered the tool catalogue this turn.
    pub fn with_tools(mut self, available: bool) -> Self {
        self.tools_available = available;
        self
    }

    /// Build the system prompt.
    pub fn build(&self) -> String {
        let mut parts: Vec<String> = vec![BASE_PROMPT.to_string()];

        if self.tools_available {
            let names: Vec<&str> = ToolRegistry::builtin()
                .definitions()
                .iter()
                .map(|d| d.name.as_str())
                .collect();
            parts.push(format!("Available tools: {}.", names.join(", ")));
        } else {
            parts.push(NO_TOOLS_PROMPT.to_string());
        }

        if let Some(section) = self.page_context.and_then(page_section) {
            parts.push(section);
        }

        parts.join("\n\n")
    }

    /// Prompt asking for an analysis of a structure snapshot.
    pub fn analysis_prompt(structure: &PageStructure) -> String {
        let snapshot = serde_json::to_string_pretty(structure).unwrap_or_default();
        format!(
            "Analyze this web page. Describe its purpose, its main sections, and the actions a user can take on it.\n\nPage structure:\n{}",
            snapshot
        )
    }

    /// Prompt asking for a summary of the page's text.
    pub fn summary_prompt(title: &str, body_text: &str) -> String {
        format!(
            "Summarize the following web page in a few short paragraphs.\n\nTitle: {}\n\nContent:\n{}",
            title, body_text
        )
    }
}

fn page_section(context: &PageContext) -> Option<String> {
    if context.is_empty() {
        return None;
    }

    let mut lines = vec!["## Current page".to_string()];
    if !context.title.is_empty() {
        lines.push(format!("Title: {}", context.title));
    }
    if !context.url.is_empty() {
        lines.push(format!("URL: {}", context.url));
    }
    if let Some(description) = context.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {}", description));
    }
    if context.interactive_count > 0 || context.form_count > 0 {
        lines.push(format!(
            "Structure: {} interactive elements, {} forms",
            context.interactive_count, context.form_count
        ));
    }
    if !context.headings.is_empty() {
        lines.push("Headings:".to_string());
        lines.extend(
            context
                .headings
                .iter()
                .take(MAX_PROMPT_HEADINGS)
                .map(|h| format!("- {}", h)),
        );
    }
    Some(lines.join("\n"))
}

#[cfg(test)]
#[path = "context_builder_tests.rs"]
mod tests;
