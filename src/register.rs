//! Provider construction and orchestrator wiring for PageHands.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use pagehands_config::{Config, ConfigError, ProviderConfig, ProviderKind};
use pagehands_protocols::bus::MessageBus;
use pagehands_protocols::error::ProviderError;
use pagehands_protocols::provider::LLMProvider;
use pagehands_provider_anthropic::AnthropicProvider;
use pagehands_provider_local::LocalProvider;
use pagehands_provider_openai::OpenAIProvider;
use pagehands_runtime::{
    ExecutorClient, OrchestratorError, ProviderFactory, SessionOrchestrator, SessionStore, SettingsStore,
};

/// Build an orchestrator over `bus` with the built-in providers.
pub async fn build_orchestrator(
    config: &Config,
    bus: Arc<dyn MessageBus>,
    settings: Arc<dyn SettingsStore>,
) -> Result<SessionOrchestrator, OrchestratorError> {
    let executor = ExecutorClient::new(bus, Duration::from_millis(config.orchestrator.injection_delay_ms));
    let orchestrator = SessionOrchestrator::new(
        config.orchestrator.clone(),
        Arc::new(SessionStore::new()),
        executor,
        settings,
        Arc::new(DefaultProviderFactory),
    )
    .await?;
    info!(
        max_history = config.orchestrator.max_history,
        session_ttl_secs = config.orchestrator.session_ttl_secs,
        "Orchestrator ready"
    );
    Ok(orchestrator)
}

/// Maps each provider tag to its provider implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Arc<dyn LLMProvider>, ProviderError> {
        let kind = config
            .kind()
            .map_err(|_| ProviderError::UnknownProvider(config.provider.clone()))?;
        let model = config.resolved_model().map_err(not_configured)?;
        let base_url = config.resolved_base_url().map_err(not_configured)?;

        let provider: Arc<dyn LLMProvider> = match kind {
            ProviderKind::OpenAI => {
                let api_key = require_key(config, kind)?;
                Arc::new(OpenAIProvider::with_base_url(api_key, model, &base_url))
            }
            ProviderKind::Anthropic => {
                let api_key = require_key(config, kind)?;
                Arc::new(AnthropicProvider::with_base_url(api_key, model, &base_url))
            }
            ProviderKind::Local => Arc::new(LocalProvider::with_base_url(model, &base_url)),
        };

        info!(
            provider = kind.as_str(),
            model = provider.model(),
            base_url = %base_url,
            "Provider created"
        );
        Ok(provider)
    }
}

fn require_key(config: &ProviderConfig, kind: ProviderKind) -> Result<String, ProviderError> {
    config
        .api_key()
        .map(str::to_string)
        .ok_or_else(|| ProviderError::NotConfigured(format!("No API key configured for {}", kind.as_str())))
}

fn not_configured(err: ConfigError) -> ProviderError {
    ProviderError::NotConfigured(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_each_provider() {
        let factory = DefaultProviderFactory;

        let openai = factory
            .create(&ProviderConfig::for_provider("openai").with_api_key("sk-test-1234567890"))
            .unwrap();
        assert_eq!(openai.id(), "openai");
        assert_eq!(openai.model(), ProviderKind::OpenAI.default_model());

        let anthropic = factory
            .create(
                &ProviderConfig::for_provider("anthropic")
                    .with_api_key("sk-ant-1234567890")
                    .with_model("claude-custom"),
            )
            .unwrap();
        assert_eq!(anthropic.id(), "anthropic");
        assert_eq!(anthropic.model(), "claude-custom");

        let local = factory.create(&ProviderConfig::for_provider("local")).unwrap();
        assert_eq!(local.id(), "local");
        assert!(!local.capabilities().tool_calling);
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let err = DefaultProviderFactory
            .create(&ProviderConfig::for_provider("anthropic"))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn test_unknown_provider() {
        let err = DefaultProviderFactory
            .create(&ProviderConfig::for_provider("gemini").with_api_key("k-1234567890"))
            .err()
            .unwrap();
        match err {
            ProviderError::UnknownProvider(name) => assert_eq!(name, "gemini"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
