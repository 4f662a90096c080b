//! Message bus errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    /// No executor is listening for the target (not injected yet, or torn down).
    #[error("Executor unreachable for target {0}")]
    Unreachable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response from executor: {0}")]
    InvalidResponse(String),
}

impl BusError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BusError::Unreachable(_))
    }
}
