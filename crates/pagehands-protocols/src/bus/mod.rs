//! Message bus protocol definitions.
//!
//! The orchestrator and the per-document page executor run in separate
//! contexts and talk only through messages. The channel itself belongs to the
//! host; this module defines the messages and the [`MessageBus`] seam.

mod messages;
mod traits;

pub use messages::*;
pub use traits::*;
