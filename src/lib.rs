//! # PageHands
//!
//! Conversational page automation: chat requests for a tab are answered by a
//! model that can read the page and act on it through the page tools.
//!
//! This crate wires the runtime to the built-in providers and to a host
//! process over a JSON-lines bridge.

use std::path::PathBuf;

pub mod bridge;
pub mod register;
pub mod settings;

pub use bridge::{BridgeBus, HostBridge, LineWriter};
pub use register::{build_orchestrator, DefaultProviderFactory};
pub use settings::FileSettingsStore;

/// The `~/.pagehands` directory.
pub fn pagehands_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".pagehands"))
        .unwrap_or_else(|| PathBuf::from(".pagehands"))
}
