//! Orchestrator errors.

use thiserror::Error;

use pagehands_config::ConfigError;
use pagehands_protocols::error::{BusError, ProviderError};

use crate::settings::SettingsError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No usable provider: missing key, or the stored settings could not build one.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Executor unreachable for tab {0}")]
    ExecutorUnreachable(String),

    #[error("Executor error: {0}")]
    Executor(BusError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrchestratorError {
    /// Plain-language message for the `{error}` reply.
    pub fn user_message(&self) -> String {
        match self {
            OrchestratorError::NotConfigured(_) => {
                "AI not configured. Please set your API key in settings.".to_string()
            }
            OrchestratorError::Provider(e) => e.user_message(),
            OrchestratorError::ExecutorUnreachable(_) => {
                "Could not reach the page. Try reloading the tab.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<BusError> for OrchestratorError {
    fn from(error: BusError) -> Self {
        match error {
            BusError::Unreachable(target) => OrchestratorError::ExecutorUnreachable(target),
            other => OrchestratorError::Executor(other),
        }
    }
}

impl From<ConfigError> for OrchestratorError {
    fn from(error: ConfigError) -> Self {
        OrchestratorError::Config(error.to_string())
    }
}

impl From<SettingsError> for OrchestratorError {
    fn from(error: SettingsError) -> Self {
        OrchestratorError::Config(error.to_string())
    }
}
