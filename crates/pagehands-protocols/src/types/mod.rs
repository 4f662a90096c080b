//! Common types.

mod common;
mod message;

pub use common::*;
pub use message::*;
