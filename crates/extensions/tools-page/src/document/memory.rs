//! In-memory [`DocumentHandle`] implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::trace;

use pagehands_protocols::error::DocumentError;
use pagehands_protocols::page::{
    DocumentHandle, DomEvent, ElementSnapshot, NodeId, ScrollPosition, SelectOption, TextNodeSnapshot,
};

use super::builder::{Child, DocumentBuilder, El};
use super::selector::{SelectorList, SelectorTree};

const MARK_CLASS: &str = "pagehands-highlight";
const NON_RENDERED: [&str; 5] = ["script", "style", "noscript", "template", "head"];
const VOID_TAGS: [&str; 6] = ["input", "br", "img", "meta", "hr", "link"];

/// Side effect recorded by a [`MemoryDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Click(NodeId),
    Dispatched(NodeId, DomEvent),
    Highlight(NodeId, Duration),
    ScrolledIntoView(NodeId),
    ValueSet(NodeId, String),
    OptionSelected(NodeId, String),
    Navigated(String),
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<usize>,
        hidden: bool,
        value: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<usize>,
    kind: NodeKind,
    alive: bool,
}

/// Text node replaced by highlight segments, kept so it can be restored.
#[derive(Debug, Clone)]
struct MarkRecord {
    original: usize,
    parent: usize,
    replacements: Vec<usize>,
    marks: usize,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
    root: usize,
}

struct State {
    tree: Tree,
    url: String,
    title: String,
    meta: BTreeMap<String, String>,
    scroll: ScrollPosition,
    viewport_height: f64,
    scroll_height: f64,
    marks: Vec<MarkRecord>,
    log: Vec<DocumentEvent>,
    selection: Option<String>,
}

/// A document held entirely in memory.
///
/// Backs the executor in tests and in hosts that mirror the page into the
/// process. There is no layout: visibility comes from the `hidden` attribute,
/// inline `display:none`/`visibility:hidden`, hidden inputs and
/// [`El::hidden`], and scrolling only moves the recorded offset.
pub struct MemoryDocument {
    state: RwLock<State>,
}

impl MemoryDocument {
    pub fn builder(url: &str, title: &str) -> DocumentBuilder {
        DocumentBuilder::new(url, title)
    }

    pub(crate) fn from_builder(builder: DocumentBuilder) -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: 0,
        };
        let body = builder.body.into_iter().fold(super::el("body"), El::child);
        tree.root = tree.insert(None, body);

        Self {
            state: RwLock::new(State {
                tree,
                url: builder.url,
                title: builder.title,
                meta: builder.meta,
                scroll: ScrollPosition::default(),
                viewport_height: builder.viewport_height,
                scroll_height: builder.scroll_height,
                marks: Vec::new(),
                log: Vec::new(),
                selection: None,
            }),
        }
    }

    /// Recorded side effects, oldest first.
    pub fn events(&self) -> Vec<DocumentEvent> {
        self.state.read().log.clone()
    }

    pub fn clear_events(&self) {
        self.state.write().log.clear();
    }

    pub fn set_selection(&self, selection: Option<&str>) {
        self.state.write().selection = selection.map(str::to_string);
    }

    /// First element with the given `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let state = self.state.read();
        state
            .tree
            .preorder(state.tree.root)
            .into_iter()
            .find(|&n| state.tree.attr(n, "id") == Some(id))
            .map(|n| NodeId(n as u64))
    }

    /// Number of highlight marks currently in the document.
    pub fn mark_count(&self) -> usize {
        let state = self.state.read();
        state
            .tree
            .preorder(state.tree.root)
            .into_iter()
            .filter(|&n| state.tree.tag(n) == "mark" && state.tree.attr(n, "class") == Some(MARK_CLASS))
            .count()
    }

    fn with_element<T>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut State, usize) -> Result<T, DocumentError>,
    ) -> Result<T, DocumentError> {
        let mut state = self.state.write();
        let index = state.tree.element_index(id)?;
        f(&mut state, index)
    }
}

impl Tree {
    fn insert(&mut self, parent: Option<usize>, el: El) -> usize {
        let index = self.nodes.len();
        let initial_value = match el.tag.as_str() {
            "input" => Some(el.attributes.get("value").cloned().unwrap_or_default()),
            _ => None,
        };
        self.nodes.push(Node {
            parent,
            kind: NodeKind::Element {
                tag: el.tag,
                attributes: el.attributes,
                children: Vec::new(),
                hidden: el.hidden,
                value: initial_value,
            },
            alive: true,
        });

        let mut children = Vec::with_capacity(el.children.len());
        for child in el.children {
            let child_index = match child {
                Child::Element(child) => self.insert(Some(index), child),
                Child::Text(text) => self.push_text(index, text),
            };
            children.push(child_index);
        }
        if let NodeKind::Element { children: slot, .. } = &mut self.nodes[index].kind {
            *slot = children;
        }

        let derived = match self.tag(index) {
            "textarea" => Some(self.raw_text(index)),
            "select" => self.default_option_value(index),
            _ => None,
        };
        if derived.is_some() {
            if let NodeKind::Element { value, .. } = &mut self.nodes[index].kind {
                *value = derived;
            }
        }
        index
    }

    fn push_text(&mut self, parent: usize, text: String) -> usize {
        self.nodes.push(Node {
            parent: Some(parent),
            kind: NodeKind::Text(text),
            alive: true,
        });
        self.nodes.len() - 1
    }

    fn children(&self, node: usize) -> &[usize] {
        match &self.nodes[node].kind {
            NodeKind::Element { children, .. } => children,
            NodeKind::Text(_) => &[],
        }
    }

    fn is_element(&self, node: usize) -> bool {
        matches!(self.nodes[node].kind, NodeKind::Element { .. })
    }

    fn element_index(&self, id: NodeId) -> Result<usize, DocumentError> {
        let index = usize::try_from(id.0).map_err(|_| DocumentError::Detached(id.0))?;
        match self.nodes.get(index) {
            Some(node) if node.alive && self.is_element(index) => Ok(index),
            _ => Err(DocumentError::Detached(id.0)),
        }
    }

    /// Alive nodes under `start` (inclusive), in document order.
    fn preorder(&self, start: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if !self.nodes[node].alive {
                continue;
            }
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        order
    }

    fn is_visible(&self, node: usize) -> bool {
        let mut current = Some(node);
        while let Some(index) = current {
            if let NodeKind::Element {
                tag,
                attributes,
                hidden,
                ..
            } = &self.nodes[index].kind
            {
                if *hidden || attributes.contains_key("hidden") || NON_RENDERED.contains(&tag.as_str()) {
                    return false;
                }
                if tag == "input" && attributes.get("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
                    return false;
                }
                if let Some(style) = attributes.get("style") {
                    let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
                    if style.contains("display:none") || style.contains("visibility:hidden") {
                        return false;
                    }
                }
            }
            current = self.nodes[index].parent;
        }
        true
    }

    /// Concatenated descendant text regardless of visibility.
    fn raw_text(&self, node: usize) -> String {
        let parts: Vec<&str> = self
            .preorder(node)
            .into_iter()
            .filter_map(|n| match &self.nodes[n].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        parts.concat()
    }

    /// Descendant text outside non-rendered elements, whitespace collapsed.
    /// Ignores visibility, like `textContent`.
    fn text_content(&self, node: usize) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if !self.nodes[n].alive {
                continue;
            }
            match &self.nodes[n].kind {
                NodeKind::Text(text) => parts.push(text),
                NodeKind::Element { tag, children, .. } => {
                    if !NON_RENDERED.contains(&tag.as_str()) {
                        stack.extend(children.iter().rev().copied());
                    }
                }
            }
        }
        collapse_whitespace(&parts.join(" "))
    }

    /// Visible descendant text, whitespace collapsed.
    fn rendered_text(&self, node: usize) -> String {
        let parts: Vec<&str> = self
            .preorder(node)
            .into_iter()
            .filter_map(|n| match &self.nodes[n].kind {
                NodeKind::Text(text) if self.nodes[n].parent.is_some_and(|p| self.is_visible(p)) => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        collapse_whitespace(&parts.join(" "))
    }

    fn own_text(&self, node: usize) -> String {
        let parts: Vec<&str> = self
            .children(node)
            .iter()
            .filter(|&&c| self.nodes[c].alive)
            .filter_map(|&c| match &self.nodes[c].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        collapse_whitespace(&parts.join(" "))
    }

    fn value(&self, node: usize) -> Option<String> {
        match &self.nodes[node].kind {
            NodeKind::Element { value, .. } => value.clone(),
            NodeKind::Text(_) => None,
        }
    }

    fn set_value(&mut self, node: usize, new_value: &str) {
        if let NodeKind::Element { value, .. } = &mut self.nodes[node].kind {
            *value = Some(new_value.to_string());
        }
    }

    fn options(&self, select: usize) -> Vec<(usize, SelectOption)> {
        self.preorder(select)
            .into_iter()
            .filter(|&n| self.tag(n) == "option")
            .map(|n| {
                let text = self.text_content(n);
                let value = self.attr(n, "value").map(str::to_string).unwrap_or_else(|| text.clone());
                (n, SelectOption::new(text, value))
            })
            .collect()
    }

    fn default_option_value(&self, select: usize) -> Option<String> {
        let options = self.options(select);
        options
            .iter()
            .find(|(n, _)| self.attr(*n, "selected").is_some())
            .or_else(|| options.first())
            .map(|(_, option)| option.value.clone())
    }

    fn label(&self, node: usize) -> Option<String> {
        if let Some(id) = self.attr(node, "id") {
            let label = self
                .preorder(self.root)
                .into_iter()
                .find(|&n| self.tag(n) == "label" && self.attr(n, "for") == Some(id));
            if let Some(label) = label {
                return Some(self.text_content(label)).filter(|t| !t.is_empty());
            }
        }
        let mut current = self.nodes[node].parent;
        while let Some(index) = current {
            if self.tag(index) == "label" {
                return Some(self.text_content(index)).filter(|t| !t.is_empty());
            }
            current = self.nodes[index].parent;
        }
        None
    }

    fn snapshot(&self, node: usize) -> ElementSnapshot {
        let (tag, attributes) = match &self.nodes[node].kind {
            NodeKind::Element { tag, attributes, .. } => (tag.clone(), attributes.clone()),
            NodeKind::Text(_) => (String::new(), BTreeMap::new()),
        };
        let is_field = matches!(tag.as_str(), "input" | "select" | "textarea");
        let options = if tag == "select" {
            self.options(node).into_iter().map(|(_, o)| o).collect()
        } else {
            Vec::new()
        };
        ElementSnapshot {
            id: NodeId(node as u64),
            own_text: self.own_text(node),
            text: self.text_content(node),
            visible: self.is_visible(node),
            value: self.value(node),
            label: if is_field { self.label(node) } else { None },
            options,
            tag,
            attributes,
        }
    }

    fn elements_under(&self, start: usize, include_start: bool) -> Vec<usize> {
        self.preorder(start)
            .into_iter()
            .filter(|&n| self.is_element(n) && (include_start || n != start))
            .collect()
    }

    fn serialize(&self, node: usize, out: &mut String) {
        match &self.nodes[node].kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element {
                tag,
                attributes,
                children,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for &child in children {
                    if self.nodes[child].alive {
                        self.serialize(child, out);
                    }
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn kill(&mut self, node: usize) {
        for n in self.preorder(node) {
            self.nodes[n].alive = false;
        }
    }
}

impl SelectorTree for Tree {
    fn tag(&self, node: usize) -> &str {
        match &self.nodes[node].kind {
            NodeKind::Element { tag, .. } => tag,
            NodeKind::Text(_) => "",
        }
    }

    fn attr(&self, node: usize, name: &str) -> Option<&str> {
        match &self.nodes[node].kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    fn parent_element(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }
}

impl State {
    fn max_scroll_y(&self) -> f64 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = ScrollPosition {
            x: x.max(0.0),
            y: y.clamp(0.0, self.max_scroll_y()),
        };
    }
}

impl DocumentHandle for MemoryDocument {
    fn url(&self) -> String {
        self.state.read().url.clone()
    }

    fn title(&self) -> String {
        self.state.read().title.clone()
    }

    fn meta(&self) -> BTreeMap<String, String> {
        self.state.read().meta.clone()
    }

    fn query(&self, selector: &str) -> Result<Vec<ElementSnapshot>, DocumentError> {
        let selector = SelectorList::parse(selector)?;
        let state = self.state.read();
        let tree = &state.tree;
        Ok(tree
            .elements_under(tree.root, true)
            .into_iter()
            .filter(|&n| selector.matches(tree, n))
            .map(|n| tree.snapshot(n))
            .collect())
    }

    fn query_within(&self, scope: NodeId, selector: &str) -> Result<Vec<ElementSnapshot>, DocumentError> {
        let selector = SelectorList::parse(selector)?;
        let state = self.state.read();
        let tree = &state.tree;
        let scope = tree.element_index(scope)?;
        Ok(tree
            .elements_under(scope, false)
            .into_iter()
            .filter(|&n| selector.matches(tree, n))
            .map(|n| tree.snapshot(n))
            .collect())
    }

    fn elements(&self) -> Vec<ElementSnapshot> {
        let state = self.state.read();
        let tree = &state.tree;
        tree.elements_under(tree.root, true)
            .into_iter()
            .map(|n| tree.snapshot(n))
            .collect()
    }

    fn element(&self, id: NodeId) -> Option<ElementSnapshot> {
        let state = self.state.read();
        state.tree.element_index(id).ok().map(|n| state.tree.snapshot(n))
    }

    fn text_nodes(&self) -> Vec<TextNodeSnapshot> {
        let state = self.state.read();
        let tree = &state.tree;
        tree.preorder(tree.root)
            .into_iter()
            .filter_map(|n| {
                let NodeKind::Text(text) = &tree.nodes[n].kind else {
                    return None;
                };
                let parent = tree.nodes[n].parent?;
                let mut ancestor_tags = Vec::new();
                let mut current = Some(parent);
                while let Some(index) = current {
                    ancestor_tags.push(tree.tag(index).to_string());
                    current = tree.nodes[index].parent;
                }
                Some(TextNodeSnapshot {
                    id: NodeId(n as u64),
                    ancestor_tags,
                    text: text.clone(),
                    visible: tree.is_visible(parent),
                })
            })
            .collect()
    }

    fn body_text(&self) -> String {
        let state = self.state.read();
        state.tree.rendered_text(state.tree.root)
    }

    fn inner_html(&self, id: NodeId) -> Result<String, DocumentError> {
        let state = self.state.read();
        let index = state.tree.element_index(id)?;
        let mut out = String::new();
        for &child in state.tree.children(index) {
            if state.tree.nodes[child].alive {
                state.tree.serialize(child, &mut out);
            }
        }
        Ok(out)
    }

    fn scroll_into_view(&self, id: NodeId) -> Result<(), DocumentError> {
        self.with_element(id, |state, _| {
            state.log.push(DocumentEvent::ScrolledIntoView(id));
            Ok(())
        })
    }

    fn highlight(&self, id: NodeId, duration: Duration) -> Result<(), DocumentError> {
        self.with_element(id, |state, _| {
            state.log.push(DocumentEvent::Highlight(id, duration));
            Ok(())
        })
    }

    fn dispatch_event(&self, id: NodeId, event: DomEvent) -> Result<(), DocumentError> {
        self.with_element(id, |state, _| {
            trace!(node = %id, event = event.as_str(), "Dispatching event");
            state.log.push(DocumentEvent::Dispatched(id, event));
            Ok(())
        })
    }

    fn click(&self, id: NodeId) -> Result<(), DocumentError> {
        self.with_element(id, |state, index| {
            if state.tree.tag(index) == "input"
                && matches!(state.tree.attr(index, "type"), Some("checkbox" | "radio"))
            {
                if let NodeKind::Element { attributes, .. } = &mut state.tree.nodes[index].kind {
                    if attributes.remove("checked").is_none() {
                        attributes.insert("checked".to_string(), String::new());
                    }
                }
            }
            state.log.push(DocumentEvent::Click(id));
            Ok(())
        })
    }

    fn set_value(&self, id: NodeId, value: &str) -> Result<(), DocumentError> {
        self.with_element(id, |state, index| {
            let tag = state.tree.tag(index).to_string();
            if !matches!(tag.as_str(), "input" | "textarea") {
                return Err(DocumentError::Unsupported {
                    tag,
                    operation: "set_value".to_string(),
                });
            }
            state.tree.set_value(index, value);
            state.log.push(DocumentEvent::ValueSet(id, value.to_string()));
            Ok(())
        })
    }

    fn select_option(&self, id: NodeId, value: &str) -> Result<(), DocumentError> {
        self.with_element(id, |state, index| {
            let tag = state.tree.tag(index).to_string();
            if tag != "select" {
                return Err(DocumentError::Unsupported {
                    tag,
                    operation: "select_option".to_string(),
                });
            }
            if !state.tree.options(index).iter().any(|(_, o)| o.value == value) {
                return Err(DocumentError::Other(format!("No option with value '{}'", value)));
            }
            state.tree.set_value(index, value);
            state.log.push(DocumentEvent::OptionSelected(id, value.to_string()));
            Ok(())
        })
    }

    fn mark_text(&self, node: NodeId, ranges: &[(usize, usize)]) -> Result<Vec<NodeId>, DocumentError> {
        let mut state = self.state.write();
        let tree = &mut state.tree;

        let index = usize::try_from(node.0).map_err(|_| DocumentError::Detached(node.0))?;
        let (text, parent) = match tree.nodes.get(index) {
            Some(Node {
                kind: NodeKind::Text(text),
                parent: Some(parent),
                alive: true,
            }) => (text.clone(), *parent),
            Some(Node { alive: true, .. }) => {
                return Err(DocumentError::Unsupported {
                    tag: tree.tag(index).to_string(),
                    operation: "mark_text".to_string(),
                });
            }
            _ => return Err(DocumentError::Detached(node.0)),
        };

        let mut cursor = 0;
        for &(start, end) in ranges {
            if start < cursor || end <= start || end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
                return Err(DocumentError::Other(format!("Invalid text range {}..{}", start, end)));
            }
            cursor = end;
        }
        if ranges.is_empty() {
            return Ok(Vec::new());
        }

        let mut replacements = Vec::new();
        let mut marks = Vec::new();
        let mut cursor = 0;
        for &(start, end) in ranges {
            if start > cursor {
                replacements.push(tree.push_text(parent, text[cursor..start].to_string()));
            }
            let mark = crate::document::el("mark")
                .class(MARK_CLASS)
                .text(&text[start..end]);
            let mark_index = tree.insert(Some(parent), mark);
            replacements.push(mark_index);
            marks.push(NodeId(mark_index as u64));
            cursor = end;
        }
        if cursor < text.len() {
            replacements.push(tree.push_text(parent, text[cursor..].to_string()));
        }

        if let NodeKind::Element { children, .. } = &mut tree.nodes[parent].kind {
            if let Some(position) = children.iter().position(|&c| c == index) {
                children.splice(position..=position, replacements.iter().copied());
            }
        }
        tree.nodes[index].alive = false;

        let count = marks.len();
        state.marks.push(MarkRecord {
            original: index,
            parent,
            replacements,
            marks: count,
        });
        Ok(marks)
    }

    fn clear_marks(&self) -> usize {
        let mut state = self.state.write();
        let records: Vec<MarkRecord> = state.marks.drain(..).collect();
        let mut removed = 0;

        for record in records.into_iter().rev() {
            let tree = &mut state.tree;
            if let NodeKind::Element { children, .. } = &mut tree.nodes[record.parent].kind {
                let position = children.iter().position(|c| record.replacements.contains(c));
                children.retain(|c| !record.replacements.contains(c));
                let position = position.unwrap_or(children.len());
                children.insert(position, record.original);
            }
            for &replacement in &record.replacements {
                tree.kill(replacement);
            }
            tree.nodes[record.original].alive = true;
            removed += record.marks;
        }
        removed
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.state.read().scroll
    }

    fn scroll_height(&self) -> f64 {
        self.state.read().scroll_height
    }

    fn scroll_by(&self, dx: f64, dy: f64) {
        let mut state = self.state.write();
        let ScrollPosition { x, y } = state.scroll;
        state.scroll_to(x + dx, y + dy);
    }

    fn scroll_to(&self, x: f64, y: f64) {
        self.state.write().scroll_to(x, y);
    }

    fn navigate(&self, url: &str) -> Result<(), DocumentError> {
        let mut state = self.state.write();
        state.url = url.to_string();
        state.log.push(DocumentEvent::Navigated(url.to_string()));
        Ok(())
    }

    fn selection(&self) -> Option<String> {
        self.state.read().selection.clone()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
