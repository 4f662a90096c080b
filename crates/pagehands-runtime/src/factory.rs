//! Provider construction seam.

use std::sync::Arc;

use pagehands_config::ProviderConfig;
use pagehands_protocols::error::ProviderError;
use pagehands_protocols::provider::LLMProvider;

/// Builds the provider selected by a configuration.
///
/// Implementations map each provider tag to one provider type; an unknown tag
/// yields [`ProviderError::UnknownProvider`].
pub trait ProviderFactory: Send + Sync {
    fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn LLMProvider>, ProviderError>;
}
