//! # PageHands Protocols
//!
//! Core protocol definitions for the PageHands orchestrator.
//! Contains shared types and interface definitions; the only behavior here is
//! the static tool catalogue and small conversion helpers.
//!
//! ## Core Traits
//!
//! - [`LLMProvider`] - Trait for text-generation backends
//! - [`DocumentHandle`] - Host-supplied access to the loaded document
//! - [`MessageBus`] - Host-supplied channel between orchestrator and page executor

pub mod bus;
pub mod error;
pub mod page;
pub mod provider;
pub mod tool;
pub mod types;

pub use bus::{ActionData, ExecutorRequest, MessageBus, OrchestratorRequest};
pub use error::{BusError, DocumentError, ProviderError, ToolErrorKind};
pub use page::{DocumentHandle, PageContext, PageStructure};
pub use provider::{CompletionRequest, CompletionResponse, LLMProvider, ProviderCapabilities};
pub use tool::{ToolDefinition, ToolName, ToolRegistry, ToolResult};
pub use types::*;
