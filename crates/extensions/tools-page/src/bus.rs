//! In-process message bus.
//!
//! Hosts that keep documents in the same process register them per tab.
//! A registered document has no executor until `inject_executor` is called,
//! which mirrors a page whose content script has not loaded yet.
//!
//! With [`InProcessBus::with_page_events`], every running executor gets a
//! [`DomChangeNotifier`] and the host reports mutations through
//! [`InProcessBus::record_mutation`].

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use pagehands_config::ExecutorConfig;
use pagehands_protocols::bus::{ExecutorRequest, MessageBus};
use pagehands_protocols::error::BusError;
use pagehands_protocols::page::DocumentHandle;

use crate::debounce::{DomChangeNotifier, PageEvent};
use crate::executor::PageExecutor;

pub struct InProcessBus {
    documents: DashMap<String, Arc<dyn DocumentHandle>>,
    executors: DashMap<String, Arc<PageExecutor>>,
    notifiers: DashMap<String, DomChangeNotifier>,
    events: Option<mpsc::UnboundedSender<PageEvent>>,
    settings: ExecutorConfig,
}

impl InProcessBus {
    pub fn new(settings: ExecutorConfig) -> Self {
        Self {
            documents: DashMap::new(),
            executors: DashMap::new(),
            notifiers: DashMap::new(),
            events: None,
            settings,
        }
    }

    /// Emit debounced `page_changed` events for tabs with a running executor.
    ///
    /// Executors must then be started inside a tokio runtime.
    pub fn with_page_events(mut self, events: mpsc::UnboundedSender<PageEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Register a tab's document without an executor.
    pub fn attach_document(&self, tab_id: &str, document: Arc<dyn DocumentHandle>) {
        self.stop_executor(tab_id);
        self.documents.insert(tab_id.to_string(), document);
        debug!(tab_id, "Document attached");
    }

    /// Register a tab's document with its executor already running.
    pub fn attach_executor(&self, tab_id: &str, document: Arc<dyn DocumentHandle>) {
        self.documents.insert(tab_id.to_string(), document.clone());
        self.start_executor(tab_id, document);
    }

    /// Drop the executor only, as after a navigation.
    pub fn reset_executor(&self, tab_id: &str) -> bool {
        self.stop_executor(tab_id)
    }

    /// Forget a tab entirely.
    pub fn detach(&self, tab_id: &str) -> bool {
        let had_executor = self.stop_executor(tab_id);
        self.documents.remove(tab_id).is_some() || had_executor
    }

    /// Report that a tab's document mutated. False if no executor observes it.
    pub fn record_mutation(&self, tab_id: &str) -> bool {
        match self.notifiers.get(tab_id) {
            Some(notifier) => {
                notifier.record_mutation();
                true
            }
            None => false,
        }
    }

    fn start_executor(&self, tab_id: &str, document: Arc<dyn DocumentHandle>) {
        self.executors.insert(
            tab_id.to_string(),
            Arc::new(PageExecutor::new(document, self.settings.clone())),
        );
        if let Some(events) = &self.events {
            self.notifiers.insert(
                tab_id.to_string(),
                DomChangeNotifier::from_settings(tab_id, &self.settings, events.clone()),
            );
        }
    }

    // A dropped notifier still flushes its pending event.
    fn stop_executor(&self, tab_id: &str) -> bool {
        self.notifiers.remove(tab_id);
        self.executors.remove(tab_id).is_some()
    }

    pub fn has_executor(&self, tab_id: &str) -> bool {
        self.executors.contains_key(tab_id)
    }

    pub fn tabs(&self) -> Vec<String> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[async_trait]
impl MessageBus for InProcessBus {
    async fn send(&self, target_id: &str, request: ExecutorRequest) -> Result<Value, BusError> {
        // Clone out of the map so no shard lock is held across the await.
        let executor = self
            .executors
            .get(target_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BusError::Unreachable(target_id.to_string()))?;
        Ok(executor.handle(request).await)
    }

    async fn inject_executor(&self, target_id: &str) -> Result<(), BusError> {
        let document = self
            .documents
            .get(target_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BusError::Unreachable(target_id.to_string()))?;
        self.start_executor(target_id, document);
        info!(tab_id = target_id, "Executor injected");
        Ok(())
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
