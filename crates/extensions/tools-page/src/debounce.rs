//! Trailing-edge debounce and DOM change notification.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use pagehands_config::ExecutorConfig;

/// Runs a callback once after triggers stop arriving for `quiet`.
///
/// Every trigger restarts the quiet period. Dropping the debounce with a
/// trigger pending still runs the callback once.
pub struct TrailingDebounce {
    tx: mpsc::UnboundedSender<()>,
    task: Option<JoinHandle<()>>,
}

impl TrailingDebounce {
    /// Spawn the debounce task on the current tokio runtime.
    pub fn spawn<F, Fut>(quiet: Duration, mut on_fire: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                let deadline = tokio::time::sleep(quiet);
                tokio::pin!(deadline);
                let mut closed = false;
                loop {
                    tokio::select! {
                        msg = rx.recv() => match msg {
                            Some(()) => deadline.as_mut().reset(Instant::now() + quiet),
                            None => {
                                closed = true;
                                break;
                            }
                        },
                        _ = &mut deadline => break,
                    }
                }
                on_fire().await;
                if closed {
                    break;
                }
            }
        });
        Self { tx, task: Some(task) }
    }

    pub fn trigger(&self) {
        // The task only exits once the sender is gone.
        let _ = self.tx.send(());
    }

    /// Flush a pending trigger and wait for the task to finish.
    pub async fn close(mut self) {
        let task = self.task.take();
        drop(self);
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

/// Event pushed from an executor to the orchestrator side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PageEvent {
    PageChanged { tab_id: String },
}

/// Coalesces DOM mutation notifications for one tab into `page_changed` events.
pub struct DomChangeNotifier {
    tab_id: String,
    debounce: TrailingDebounce,
}

impl DomChangeNotifier {
    pub fn new(tab_id: impl Into<String>, quiet: Duration, events: mpsc::UnboundedSender<PageEvent>) -> Self {
        let tab_id = tab_id.into();
        let event_tab = tab_id.clone();
        let debounce = TrailingDebounce::spawn(quiet, move || {
            let event = PageEvent::PageChanged {
                tab_id: event_tab.clone(),
            };
            let events = events.clone();
            async move {
                debug!(?event, "Page settled after mutations");
                let _ = events.send(event);
            }
        });
        Self { tab_id, debounce }
    }

    pub fn from_settings(
        tab_id: impl Into<String>,
        settings: &ExecutorConfig,
        events: mpsc::UnboundedSender<PageEvent>,
    ) -> Self {
        Self::new(tab_id, Duration::from_millis(settings.debounce_ms), events)
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    /// Report that the document mutated.
    pub fn record_mutation(&self) {
        trace!(tab_id = %self.tab_id, "DOM mutation");
        self.debounce.trigger();
    }

    /// Flush any pending notification and stop.
    pub async fn close(self) {
        self.debounce.close().await;
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
