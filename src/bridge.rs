//! JSON-lines bridge between a host process and the orchestrator.
//!
//! The host owns the loaded documents and their executors; PageHands owns the
//! sessions. Both sides exchange newline-delimited JSON objects tagged by
//! `type`.
//!
//! Host to PageHands:
//!
//! ```text
//! {"type":"request","id":1,"request":{"action":"chat","tabId":"12","message":"..."}}
//! {"type":"executor_reply","id":7,"result":{...}}
//! {"type":"executor_reply","id":7,"error":{"message":"no executor","unreachable":true}}
//! ```
//!
//! PageHands to host:
//!
//! ```text
//! {"type":"response","id":1,"result":{...}}
//! {"type":"executor_request","id":7,"tabId":"12","request":{"action":"get_structure"}}
//! {"type":"inject_executor","id":8,"tabId":"12"}
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use pagehands_protocols::bus::{ExecutorRequest, MessageBus};
use pagehands_protocols::error::BusError;
use pagehands_runtime::SessionOrchestrator;

/// Messages read from the host.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Inbound {
    Request {
        id: Value,
        request: Value,
    },
    ExecutorReply {
        id: u64,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<ReplyError>,
    },
}

#[derive(Debug, Deserialize)]
struct ReplyError {
    message: String,
    /// The tab has no executor listening.
    #[serde(default)]
    unreachable: bool,
}

/// Messages written to the host.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
enum Outbound {
    Response {
        id: Value,
        result: Value,
    },
    ExecutorRequest {
        id: u64,
        tab_id: String,
        request: ExecutorRequest,
    },
    InjectExecutor {
        id: u64,
        tab_id: String,
    },
}

/// Serializes whole lines onto the host's input.
pub struct LineWriter {
    inner: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl LineWriter {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Mutex::new(Box::new(writer)),
        }
    }

    async fn write(&self, message: &Outbound) -> io::Result<()> {
        let mut line = serde_json::to_vec(message).map_err(io::Error::other)?;
        line.push(b'\n');

        let mut writer = self.inner.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await
    }
}

struct PendingReply {
    tab_id: String,
    sender: oneshot::Sender<Result<Value, BusError>>,
}

type PendingReplies = HashMap<u64, PendingReply>;

/// [`MessageBus`] whose executors live in the host process.
pub struct BridgeBus {
    writer: Arc<LineWriter>,
    request_id: AtomicU64,
    pending: RwLock<PendingReplies>,
    /// Set once the host has gone; no reply can arrive after that.
    closed: AtomicBool,
    timeout: Duration,
}

impl BridgeBus {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(writer: Arc<LineWriter>) -> Self {
        Self {
            writer,
            request_id: AtomicU64::new(1),
            pending: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// How long to wait for the host to answer one request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    async fn call(&self, tab_id: &str, message: impl FnOnce(u64) -> Outbound) -> Result<Value, BusError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.write().await;
            if self.closed.load(Ordering::SeqCst) {
                return Err(BusError::Transport("Host disconnected".to_string()));
            }
            pending.insert(
                id,
                PendingReply {
                    tab_id: tab_id.to_string(),
                    sender: tx,
                },
            );
        }

        if let Err(e) = self.writer.write(&message(id)).await {
            self.pending.write().await.remove(&id);
            return Err(BusError::Transport(format!("Failed to write to host: {}", e)));
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BusError::Transport("Reply channel closed".to_string())),
            Err(_) => {
                self.pending.write().await.remove(&id);
                Err(BusError::Transport(format!(
                    "No reply from tab {} after {}ms",
                    tab_id,
                    self.timeout.as_millis()
                )))
            }
        }
    }

    /// Resolve a pending request with the host's reply.
    async fn complete(&self, id: u64, result: Option<Value>, error: Option<ReplyError>) {
        let Some(pending) = self.pending.write().await.remove(&id) else {
            warn!(id, "Reply for unknown or expired request");
            return;
        };

        let result = match error {
            Some(e) if e.unreachable => Err(BusError::Unreachable(pending.tab_id)),
            Some(e) => Err(BusError::Transport(e.message)),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        let _ = pending.sender.send(result);
    }

    /// Fail every outstanding request and refuse new ones.
    async fn fail_pending(&self, reason: &str) {
        let drained: Vec<_> = {
            let mut pending = self.pending.write().await;
            self.closed.store(true, Ordering::SeqCst);
            pending.drain().collect()
        };
        if !drained.is_empty() {
            warn!(count = drained.len(), "Failing requests still waiting on the host");
        }
        for (_, pending) in drained {
            let _ = pending.sender.send(Err(BusError::Transport(reason.to_string())));
        }
    }
}

#[async_trait]
impl MessageBus for BridgeBus {
    async fn send(&self, target_id: &str, request: ExecutorRequest) -> Result<Value, BusError> {
        debug!(tab_id = target_id, action = request.action(), "Executor request to host");
        self.call(target_id, |id| Outbound::ExecutorRequest {
            id,
            tab_id: target_id.to_string(),
            request,
        })
        .await
    }

    async fn inject_executor(&self, target_id: &str) -> Result<(), BusError> {
        self.call(target_id, |id| Outbound::InjectExecutor {
            id,
            tab_id: target_id.to_string(),
        })
        .await
        .map(|_| ())
    }
}

/// Serves orchestrator requests read from the host.
pub struct HostBridge {
    orchestrator: Arc<SessionOrchestrator>,
    bus: Arc<BridgeBus>,
    writer: Arc<LineWriter>,
}

impl HostBridge {
    pub fn new(orchestrator: Arc<SessionOrchestrator>, bus: Arc<BridgeBus>, writer: Arc<LineWriter>) -> Self {
        Self {
            orchestrator,
            bus,
            writer,
        }
    }

    /// Read host messages until end of input.
    ///
    /// Requests run concurrently; executor replies are routed to the waiting
    /// request. At end of input, requests still waiting on the host fail and
    /// in-flight responses are written before returning.
    pub async fn serve<R>(&self, reader: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut tasks = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Inbound>(line) {
                Ok(Inbound::Request { id, request }) => {
                    let orchestrator = self.orchestrator.clone();
                    let writer = self.writer.clone();
                    tasks.spawn(async move {
                        let result = orchestrator.handle_value(request).await;
                        if let Err(e) = writer.write(&Outbound::Response { id, result }).await {
                            error!("Failed to write response: {}", e);
                        }
                    });
                }
                Ok(Inbound::ExecutorReply { id, result, error }) => {
                    self.bus.complete(id, result, error).await;
                }
                Err(e) => {
                    warn!("Ignoring malformed host message: {} - {}", e, preview(line));
                }
            }

            while let Some(finished) = tasks.try_join_next() {
                if let Err(e) = finished {
                    error!("Request task failed: {}", e);
                }
            }
        }

        info!("Host closed the channel");
        self.bus.fail_pending("Host disconnected").await;
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                error!("Request task failed: {}", e);
            }
        }
        Ok(())
    }
}

/// At most the first 200 characters of a line, for logging.
fn preview(line: &str) -> &str {
    line.char_indices().nth(200).map_or(line, |(i, _)| &line[..i])
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
