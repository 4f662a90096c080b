//! LLM Provider errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(message),
            400 => ProviderError::InvalidRequest(message),
            429 => ProviderError::RateLimited(message),
            500..=599 => ProviderError::ServerError { status, message },
            _ => ProviderError::ApiError { status, message },
        }
    }

    /// Only rate limiting and server-side failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_) | ProviderError::ServerError { .. }
        )
    }

    /// Plain-language message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Timeout(_) => {
                "The AI provider took too long to respond. Please try again.".to_string()
            }
            ProviderError::AuthenticationFailed(_) => {
                "Authentication failed. Please check your API key in settings.".to_string()
            }
            ProviderError::InvalidRequest(msg) => format!("The AI provider rejected the request: {}", msg),
            ProviderError::RateLimited(_) | ProviderError::ServerError { .. } => {
                "The AI provider is busy or unavailable right now. Please try again later.".to_string()
            }
            ProviderError::ApiError { status, message } => {
                format!("The AI provider returned an error ({}): {}", status, message)
            }
            ProviderError::Network(msg) => format!("Could not reach the AI provider: {}", msg),
            ProviderError::InvalidResponse(_) => {
                "The AI provider returned a response that could not be understood.".to_string()
            }
            ProviderError::UnknownProvider(name) => {
                format!("Unknown AI provider '{}'. Please pick a supported provider in settings.", name)
            }
            ProviderError::NotConfigured(_) => {
                "AI not configured. Please set your API key in settings.".to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
