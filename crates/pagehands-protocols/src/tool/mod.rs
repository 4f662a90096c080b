//! Tool protocol definitions.
//!
//! Tools are the declarative actions the model may ask the page executor to
//! perform.

mod catalogue;
mod definition;
mod result;

pub use catalogue::*;
pub use definition::*;
pub use result::*;
