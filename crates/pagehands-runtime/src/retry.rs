//! Provider retry, backoff and per-attempt deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use pagehands_config::ProviderConfig;
use pagehands_protocols::error::ProviderError;
use pagehands_protocols::provider::{
    CompletionRequest, CompletionResponse, LLMProvider, ProviderCapabilities,
};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; `max_retries + 1` attempts in total.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every later one.
    pub base_delay: Duration,
    /// Deadline for a single attempt.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ProviderConfig> for RetryConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: Duration::from_millis(config.timeout_ms),
            ..Default::default()
        }
    }
}

impl RetryConfig {
    /// Backoff before retry number `attempt + 1`: `base_delay * 2^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }
}

/// Provider wrapper adding the deadline and the retry schedule.
///
/// Holds no state between calls; every `complete` starts a fresh schedule.
pub struct RetryProvider {
    inner: Arc<dyn LLMProvider>,
    config: RetryConfig,
}

impl RetryProvider {
    pub fn new(provider: Arc<dyn LLMProvider>, config: RetryConfig) -> Self {
        Self {
            inner: provider,
            config,
        }
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let deadline = self.config.timeout;
        let mut attempt = 0;

        loop {
            let outcome = match timeout(deadline, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(deadline.as_millis() as u64)),
            };

            match outcome {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() || attempt >= self.config.max_retries => return Err(e),
                Err(e) => {
                    let delay = self.config.delay_for_attempt(attempt);
                    warn!(
                        "Provider error (attempt {}/{}): {}, retrying in {:?}",
                        attempt + 1,
                        self.config.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl LLMProvider for RetryProvider {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        self.inner.capabilities()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        debug!(provider = self.inner.id(), model = self.inner.model(), "Completing with retry");
        self.with_retry(|| {
            let req = request.clone();
            let provider = self.inner.clone();
            async move { provider.complete(req).await }
        })
        .await
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
