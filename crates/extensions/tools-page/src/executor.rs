//! Page executor: runs tool calls against one document.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};

use pagehands_config::ExecutorConfig;
use pagehands_protocols::bus::ExecutorRequest;
use pagehands_protocols::error::ToolErrorKind;
use pagehands_protocols::page::{DocumentHandle, PageStructure};
use pagehands_protocols::tool::{ToolName, ToolResult};

use crate::actions::{self, ActionContext};
use crate::resolver::{ElementResolver, ResolveScope};
use crate::structure::page_structure;

pub struct PageExecutor {
    document: Arc<dyn DocumentHandle>,
    settings: ExecutorConfig,
}

impl PageExecutor {
    pub fn new(document: Arc<dyn DocumentHandle>, settings: ExecutorConfig) -> Self {
        Self { document, settings }
    }

    pub fn document(&self) -> &Arc<dyn DocumentHandle> {
        &self.document
    }

    pub fn get_structure(&self) -> PageStructure {
        page_structure(self.document.as_ref())
    }

    /// Execute a tool by name. Never fails; errors are carried in the result.
    pub async fn execute_tool(&self, name: &str, params: Value) -> ToolResult {
        let tool: ToolName = match name.parse() {
            Ok(tool) => tool,
            Err(message) => return ToolResult::failure(name, ToolErrorKind::UnknownTool, message),
        };
        let ctx = ActionContext::new(self.document.as_ref(), &self.settings);
        let result = actions::run(&ctx, tool, params)
            .instrument(info_span!("execute_tool", tool = tool.as_str()))
            .await;
        debug!(tool = tool.as_str(), success = result.success, "Tool finished");
        result
    }

    /// Handle one bus request and produce its JSON reply.
    pub async fn handle(&self, request: ExecutorRequest) -> Value {
        match request {
            ExecutorRequest::GetStructure => to_value(&self.get_structure()),
            ExecutorRequest::ExecuteTool { tool, params, .. } => to_value(&self.execute_tool(&tool, params).await),
            ExecutorRequest::ExecuteAction { data } => to_value(&self.execute_tool(&data.tool, data.params).await),
            ExecutorRequest::Highlight { selector } => self.highlight(&selector),
            ExecutorRequest::ScrollTo { selector } => self.scroll_to(&selector),
            ExecutorRequest::GetSelection => json!({ "selection": self.document.selection() }),
        }
    }

    fn highlight(&self, selector: &str) -> Value {
        let resolved = match ElementResolver::new(self.document.as_ref()).resolve("", Some(selector), ResolveScope::Clickable) {
            Ok(resolved) => resolved,
            Err(e) => return json!({ "success": false, "error": e.to_string() }),
        };
        let duration = Duration::from_millis(self.settings.highlight_ms);
        match self.document.highlight(resolved.element.id, duration) {
            Ok(()) => json!({ "success": true }),
            Err(e) => json!({ "success": false, "error": e.to_string() }),
        }
    }

    fn scroll_to(&self, selector: &str) -> Value {
        let found = match self.document.query(selector) {
            Ok(found) => found,
            Err(e) => return json!({ "success": false, "error": e.to_string() }),
        };
        let Some(element) = found.first() else {
            return json!({ "success": false, "error": format!("No element matches '{}'", selector) });
        };
        match self.document.scroll_into_view(element.id) {
            Ok(()) => json!({ "success": true }),
            Err(e) => json!({ "success": false, "error": e.to_string() }),
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| json!({ "error": e.to_string() }))
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
