//! Message bus trait definition.

use async_trait::async_trait;
use serde_json::Value;

use super::ExecutorRequest;
use crate::error::BusError;

/// Request/response channel from the orchestrator to page executors.
///
/// `target_id` addresses one loaded document (a tab). An executor may be
/// absent until the host injects it; `send` then fails with
/// [`BusError::Unreachable`].
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Send a request to the executor for `target_id` and await its reply.
    async fn send(&self, target_id: &str, request: ExecutorRequest) -> Result<Value, BusError>;

    /// Ask the host to (re)inject the executor into `target_id`.
    async fn inject_executor(&self, target_id: &str) -> Result<(), BusError>;
}
