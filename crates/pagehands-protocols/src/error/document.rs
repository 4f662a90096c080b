//! Document access errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Node {0} is detached from the document")]
    Detached(u64),

    #[error("Operation not supported on <{tag}>: {operation}")]
    Unsupported { tag: String, operation: String },

    #[error("Document error: {0}")]
    Other(String),
}
