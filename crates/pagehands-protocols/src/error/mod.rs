//! Error types for the PageHands protocol layer.

mod bus;
mod document;
mod provider;
mod tool;

pub use bus::*;
pub use document::*;
pub use provider::*;
pub use tool::*;
