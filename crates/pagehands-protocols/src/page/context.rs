//! Page context carried with chat requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact description of the page a request is about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub headings: Vec<String>,
    pub description: Option<String>,
    pub interactive_count: usize,
    pub form_count: usize,
}

impl PageContext {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn with_headings(mut self, headings: Vec<String>) -> Self {
        self.headings = headings;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty() && self.title.is_empty()
    }
}
