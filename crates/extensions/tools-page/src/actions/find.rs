use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use pagehands_protocols::tool::{ToolName, ToolResult};

use super::{invalid, parse_params, ActionContext};

const EXCLUDED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];
const EXCERPT_CONTEXT: usize = 40;

#[derive(Debug, Deserialize)]
pub struct FindParams {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Highlight every occurrence of the query and scroll to the first.
///
/// Marks from a previous search are cleared first, so repeating a search
/// yields the same count.
pub fn find_text(ctx: &ActionContext<'_>, params: Value) -> ToolResult {
    const TOOL: ToolName = ToolName::FindText;
    let params: FindParams = match parse_params(TOOL, params) {
        Ok(p) => p,
        Err(result) => return result,
    };
    if params.query.trim().is_empty() {
        return invalid(TOOL, "A search query is required");
    }

    let document = ctx.document;
    let cleared = document.clear_marks();
    if cleared > 0 {
        debug!("Cleared {} previous highlights", cleared);
    }

    let pattern = match RegexBuilder::new(&regex::escape(&params.query))
        .case_insensitive(!params.case_sensitive)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => return invalid(TOOL, format!("Invalid query: {}", e)),
    };

    let mut count = 0;
    let mut excerpts = Vec::new();
    let mut first_mark = None;

    for node in document.text_nodes() {
        if !node.visible || node.ancestor_tags.iter().any(|t| EXCLUDED_TAGS.contains(&t.as_str())) {
            continue;
        }
        let ranges: Vec<(usize, usize)> = pattern
            .find_iter(&node.text)
            .map(|m| (m.start(), m.end()))
            .collect();
        if ranges.is_empty() {
            continue;
        }

        count += ranges.len();
        for &(start, end) in &ranges {
            if excerpts.len() >= ctx.settings.max_excerpts {
                break;
            }
            excerpts.push(excerpt(&node.text, start, end));
        }

        match document.mark_text(node.id, &ranges) {
            Ok(marks) => {
                if first_mark.is_none() {
                    first_mark = marks.first().copied();
                }
            }
            Err(e) => warn!("Could not highlight text node {}: {}", node.id, e),
        }
    }

    if let Some(first) = first_mark {
        if let Err(e) = document.scroll_into_view(first) {
            warn!("Could not scroll to first match: {}", e);
        }
    }

    debug!(query = %params.query, count, "Find text complete");
    ToolResult::success(TOOL.as_str())
        .with_data("query", params.query)
        .with_data("count", count)
        .with_data("excerpts", excerpts)
}

/// The match with up to forty characters of context on each side.
fn excerpt(text: &str, start: usize, end: usize) -> String {
    let before: usize = text[..start]
        .chars()
        .rev()
        .take(EXCERPT_CONTEXT)
        .map(char::len_utf8)
        .sum();
    let after: usize = text[end..].chars().take(EXCERPT_CONTEXT).map(char::len_utf8).sum();
    let from = start - before;
    let to = end + after;

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(&text[from..to].split_whitespace().collect::<Vec<_>>().join(" "));
    if to < text.len() {
        out.push_str("...");
    }
    out
}
