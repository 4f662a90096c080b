//! Declarative construction of in-memory documents.

use std::collections::BTreeMap;

use super::memory::MemoryDocument;

/// Element description used to build a [`MemoryDocument`].
#[derive(Debug, Clone, Default)]
pub struct El {
    pub(crate) tag: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) children: Vec<Child>,
    pub(crate) hidden: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Child {
    Element(El),
    Text(String),
}

/// Start an element.
pub fn el(tag: &str) -> El {
    El {
        tag: tag.to_ascii_lowercase(),
        ..Default::default()
    }
}

impl El {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    /// Append a text child.
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Child::Text(text.to_string()));
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children.into_iter().map(Child::Element));
        self
    }

    /// Render the element invisible (as if by computed style).
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Builder for [`MemoryDocument`].
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    pub(crate) url: String,
    pub(crate) title: String,
    pub(crate) meta: BTreeMap<String, String>,
    pub(crate) body: Vec<El>,
    pub(crate) viewport_height: f64,
    pub(crate) scroll_height: f64,
}

impl DocumentBuilder {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            meta: BTreeMap::new(),
            body: Vec::new(),
            viewport_height: 800.0,
            scroll_height: 3000.0,
        }
    }

    pub fn meta(mut self, name: &str, content: &str) -> Self {
        self.meta.insert(name.to_string(), content.to_string());
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.body.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.body.extend(children);
        self
    }

    pub fn viewport(mut self, viewport_height: f64, scroll_height: f64) -> Self {
        self.viewport_height = viewport_height;
        self.scroll_height = scroll_height.max(viewport_height);
        self
    }

    pub fn build(self) -> MemoryDocument {
        MemoryDocument::from_builder(self)
    }
}
