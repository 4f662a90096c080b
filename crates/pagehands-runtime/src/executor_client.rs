//! Orchestrator side of the executor channel.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use pagehands_protocols::bus::{ActionData, ExecutorRequest, MessageBus};
use pagehands_protocols::error::{BusError, ToolErrorKind};
use pagehands_protocols::page::PageStructure;
use pagehands_protocols::tool::ToolResult;
use pagehands_protocols::types::ToolCall;

/// Sends executor requests for a tab, injecting the executor once if absent.
pub struct ExecutorClient {
    bus: Arc<dyn MessageBus>,
    injection_delay: Duration,
}

impl ExecutorClient {
    pub fn new(bus: Arc<dyn MessageBus>, injection_delay: Duration) -> Self {
        Self {
            bus,
            injection_delay,
        }
    }

    /// Send a request; on `Unreachable`, inject the executor, pause, and retry once.
    pub async fn send(&self, tab_id: &str, request: ExecutorRequest) -> Result<Value, BusError> {
        match self.bus.send(tab_id, request.clone()).await {
            Err(BusError::Unreachable(_)) => {
                info!(tab_id, action = request.action(), "Executor unreachable, injecting");
                self.bus.inject_executor(tab_id).await?;
                tokio::time::sleep(self.injection_delay).await;
                self.bus.send(tab_id, request).await
            }
            other => other,
        }
    }

    /// Fetch a fresh structure snapshot.
    pub async fn get_structure(&self, tab_id: &str) -> Result<PageStructure, BusError> {
        let value = self.send(tab_id, ExecutorRequest::GetStructure).await?;
        serde_json::from_value(value).map_err(|e| BusError::InvalidResponse(e.to_string()))
    }

    /// Execute one tool call. Never fails: every problem becomes a failed result.
    pub async fn execute_tool(&self, tab_id: &str, call: &ToolCall) -> ToolResult {
        let params = match call.parsed_arguments() {
            Ok(params) => params,
            Err(e) => {
                warn!(tool = %call.name, "Unparseable tool arguments: {}", e);
                return ToolResult::failure(
                    &call.name,
                    ToolErrorKind::InvalidParameters,
                    format!("Invalid arguments: {}", e),
                );
            }
        };

        debug!(tab_id, tool = %call.name, call_id = %call.id, "Dispatching tool call");
        self.run_tool(tab_id, &call.name, params, Some(call.id.clone())).await
    }

    /// Execute a tool by name with already-parsed parameters.
    pub async fn run_tool(
        &self,
        tab_id: &str,
        tool: &str,
        params: Value,
        tool_call_id: Option<String>,
    ) -> ToolResult {
        let request = ExecutorRequest::ExecuteTool {
            tool: tool.to_string(),
            params,
            tool_call_id,
        };
        self.to_result(tool, self.send(tab_id, request).await)
    }

    /// Execute a tool directly, bypassing the model.
    pub async fn execute_action(&self, tab_id: &str, data: ActionData) -> ToolResult {
        let tool = data.tool.clone();
        let reply = self.send(tab_id, ExecutorRequest::ExecuteAction { data }).await;
        self.to_result(&tool, reply)
    }

    fn to_result(&self, tool: &str, reply: Result<Value, BusError>) -> ToolResult {
        match reply {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                ToolResult::failure(
                    tool,
                    ToolErrorKind::ActionExecutionFailed,
                    format!("Malformed executor reply: {}", e),
                )
            }),
            Err(BusError::Unreachable(target)) => ToolResult::failure(
                tool,
                ToolErrorKind::ExecutorUnreachable,
                format!("Executor unreachable for tab {}", target),
            ),
            Err(e) => ToolResult::failure(tool, ToolErrorKind::ActionExecutionFailed, e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "executor_client_tests.rs"]
mod tests;
