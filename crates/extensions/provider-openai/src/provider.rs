//! OpenAI provider implementation.

use async_trait::async_trait;
use tracing::debug;

use pagehands_protocols::error::ProviderError;
use pagehands_protocols::provider::{
    CompletionRequest, CompletionResponse, LLMProvider, ProviderCapabilities,
};

use crate::api::{ApiRequest, ApiResponse};
use crate::converter::{convert_messages, convert_tools};
use crate::parser::{parse_error_message, parse_response};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI LLM provider.
pub struct OpenAIProvider {
    api_key: String,
    model: String,
    api_url: String,
    client: reqwest::Client,
    capabilities: ProviderCapabilities,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_MODEL, DEFAULT_BASE_URL)
    }

    /// Create provider with a custom base URL (for OpenAI-compatible APIs).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl AsRef<str>,
    ) -> Self {
        let base = base_url.as_ref().trim_end_matches('/');
        Self {
            api_key: api_key.into(),
            model: model.into(),
            api_url: format!("{}/chat/completions", base),
            client: reqwest::Client::new(),
            capabilities: ProviderCapabilities {
                tool_calling: true,
                separate_system: false,
            },
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        let tools = convert_tools(request);
        let tool_choice = if tools.is_empty() { None } else { Some("auto".to_string()) };
        ApiRequest {
            model: self.model.clone(),
            messages: convert_messages(request),
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            tools,
            tool_choice,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, parse_error_message(&body)));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let api_request = self.build_request(&request);
        debug!(
            model = %api_request.model,
            messages = api_request.messages.len(),
            tools = api_request.tools.len(),
            "Sending chat completion"
        );
        let response = self.send_request(&api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parse_response(api_response)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
