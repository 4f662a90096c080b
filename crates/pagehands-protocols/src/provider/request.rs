//! Canonical completion request.

use serde::{Deserialize, Serialize};

use crate::tool::ToolDefinition;
use crate::types::Message;

/// Backend-neutral request every provider variant translates from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt.
    pub system: String,

    /// Messages in the conversation, oldest first.
    pub messages: Vec<Message>,

    /// Tools offered to the model.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,

    /// Temperature for sampling (0.0 - 2.0).
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a new completion request.
    pub fn new(system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system: system.into(),
            messages,
            tools: Vec::new(),
            temperature: 0.7,
            max_tokens: 4096,
        }
    }

    /// Set the tools.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_new() {
        let request = CompletionRequest::new("Be helpful", vec![Message::user("Hello")]);
        assert_eq!(request.system, "Be helpful");
        assert_eq!(request.messages.len(), 1);
        assert!(!request.has_tools());
        assert_eq!(request.max_tokens, 4096);
    }

    #[test]
    fn test_completion_request_builder_chain() {
        let request = CompletionRequest::new("sys", vec![])
            .with_max_tokens(1000)
            .with_temperature(0.2)
            .with_tools(crate::tool::ToolRegistry::builtin().definitions().to_vec());

        assert_eq!(request.max_tokens, 1000);
        assert!((request.temperature - 0.2).abs() < 0.001);
        assert_eq!(request.tools.len(), 6);
    }
}
