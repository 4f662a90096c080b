//! # PageHands Runtime
//!
//! Conversation state and turn handling for the PageHands orchestrator:
//! provider retry, per-tab sessions, system prompt construction, the
//! executor client and the [`SessionOrchestrator`] that ties them together.

mod context_builder;
mod error;
mod executor_client;
mod factory;
mod orchestrator;
mod retry;
mod session;
mod session_store;
mod settings;

pub use context_builder::ContextBuilder;
pub use error::OrchestratorError;
pub use executor_client::ExecutorClient;
pub use factory::ProviderFactory;
pub use orchestrator::{ChatResponse, SessionOrchestrator};
pub use retry::{RetryConfig, RetryProvider};
pub use session::Session;
pub use session_store::{SessionCleaner, SessionStore};
pub use settings::{MemorySettingsStore, SettingsError, SettingsStore};
