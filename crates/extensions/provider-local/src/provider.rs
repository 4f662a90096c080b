//! Local provider implementation.

use async_trait::async_trait;
use tracing::debug;

use pagehands_protocols::error::ProviderError;
use pagehands_protocols::provider::{
    CompletionRequest, CompletionResponse, LLMProvider, ProviderCapabilities,
};
use pagehands_protocols::types::Usage;

use crate::api::{ApiErrorBody, ApiOptions, ApiRequest, ApiResponse};
use crate::converter::convert_messages;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";

/// Local LLM provider (Ollama `/api/chat`).
pub struct LocalProvider {
    model: String,
    api_url: String,
    client: reqwest::Client,
    capabilities: ProviderCapabilities,
}

impl LocalProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_MODEL, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(model: impl Into<String>, base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            model: model.into(),
            api_url: format!("{}/api/chat", base),
            client: reqwest::Client::new(),
            capabilities: ProviderCapabilities {
                tool_calling: false,
                separate_system: false,
            },
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: convert_messages(request),
            stream: false,
            options: ApiOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMProvider for LocalProvider {
    fn id(&self) -> &str {
        "local"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        if request.has_tools() {
            debug!(tools = request.tools.len(), "Local provider ignores offered tools");
        }
        let api_request = self.build_request(&request);

        let response = self
            .client
            .post(&self.api_url)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ProviderError::from_status(status, message));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let usage = match (api_response.prompt_eval_count, api_response.eval_count) {
            (Some(prompt), Some(completion)) => Some(Usage::new(prompt, completion)),
            _ => None,
        };

        Ok(CompletionResponse::new(api_response.message.content, Vec::new(), usage))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
