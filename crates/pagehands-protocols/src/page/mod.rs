//! Page protocol definitions.
//!
//! ## Core Concepts
//!
//! - **DocumentHandle**: host-supplied access to the loaded document
//! - **PageStructure**: read-only structural snapshot, rebuilt on every request
//! - **PageContext**: the compact summary the orchestrator embeds in prompts

mod context;
mod document;
mod structure;

pub use context::*;
pub use document::*;
pub use structure::*;
