//! In-memory document model.

mod builder;
mod memory;
mod selector;

pub use builder::{el, DocumentBuilder, El};
pub use memory::{DocumentEvent, MemoryDocument};
pub use selector::{SelectorList, SelectorTree};
