//! Session storage and idle-session cleanup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, info};

use crate::session::Session;

/// Live sessions keyed by tab id.
///
/// Each session sits behind its own async mutex: a chat turn holds the lock
/// for its whole duration, so turns for one tab run one after another while
/// turns for different tabs interleave freely.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a tab's session, creating an empty one if absent.
    pub fn get_or_create(&self, tab_id: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(tab_id.to_string())
            .or_insert_with(|| {
                debug!(tab_id, "Creating session");
                Arc::new(Mutex::new(Session::new(tab_id)))
            })
            .clone()
    }

    pub fn get(&self, tab_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(tab_id).map(|entry| entry.value().clone())
    }

    /// Remove a session. Returns whether one existed.
    pub fn remove(&self, tab_id: &str) -> bool {
        let removed = self.sessions.remove(tab_id).is_some();
        if removed {
            debug!(tab_id, "Removed session");
        }
        removed
    }

    pub fn contains(&self, tab_id: &str) -> bool {
        self.sessions.contains_key(tab_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove sessions idle for longer than `ttl`. Returns how many were removed.
    ///
    /// Sessions locked by an in-flight turn are active by definition and skipped.
    pub fn sweep_stale(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let now = Utc::now();

        let stale: Vec<(String, Arc<Mutex<Session>>)> = self
            .sessions
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .try_lock()
                    .map(|session| session.is_idle(ttl, now))
                    .unwrap_or(false)
            })
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut removed = 0;
        for (tab_id, handle) in stale {
            if self
                .sessions
                .remove_if(&tab_id, |_, current| Arc::ptr_eq(current, &handle))
                .is_some()
            {
                debug!(tab_id = %tab_id, "Evicted idle session");
                removed += 1;
            }
        }
        removed
    }
}

/// Periodic sweeper evicting idle sessions.
pub struct SessionCleaner {
    store: Arc<SessionStore>,
    ttl: Duration,
    interval: Duration,
}

impl SessionCleaner {
    pub fn new(store: Arc<SessionStore>, ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            store,
            ttl,
            interval: sweep_interval,
        }
    }

    /// Run one sweep.
    pub fn sweep(&self) -> usize {
        let count = self.store.sweep_stale(self.ttl);
        if count > 0 {
            info!("Cleaned up {} idle sessions", count);
        }
        count
    }

    /// Start the cleanup task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
