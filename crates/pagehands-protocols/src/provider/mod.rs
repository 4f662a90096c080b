//! LLM Provider protocol definitions.
//!
//! Providers translate the canonical request/response pair to and from a
//! backend's wire format.

mod request;
mod response;
mod traits;

pub use request::*;
pub use response::*;
pub use traits::*;
