//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, ProviderKind};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_provider(config, &mut result);
        Self::validate_orchestrator(config, &mut result);
        Self::validate_executor(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        let provider = &config.provider;

        match provider.kind() {
            Ok(kind) => {
                if kind.requires_api_key() && provider.api_key().is_none() {
                    result.add_warning(ValidationWarning::new(
                        "provider.api_key",
                        format!("API key is not set; chat with '{}' will report not configured", kind),
                    ));
                }
                if kind == ProviderKind::Local && provider.api_key().is_some() {
                    result.add_warning(ValidationWarning::new(
                        "provider.api_key",
                        "API key is ignored by the local provider",
                    ));
                }
            }
            Err(_) => {
                result.add_error(ValidationError::new(
                    "provider.provider",
                    format!(
                        "Unknown provider '{}', valid values: openai, anthropic, local",
                        provider.provider
                    ),
                ));
            }
        }

        if let Some(ref url) = provider.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "provider.base_url",
                    "base_url must start with http:// or https://",
                ));
            }
        }

        if provider.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "provider.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }

        if provider.max_retries > 10 {
            result.add_warning(ValidationWarning::new(
                "provider.max_retries",
                "max_retries is very high (>10); backoff doubles on every attempt",
            ));
        }

        if !(0.0..=2.0).contains(&provider.temperature) {
            result.add_error(ValidationError::new(
                "provider.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }

        if provider.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "provider.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
    }

    fn validate_orchestrator(config: &Config, result: &mut ValidationResult) {
        let orchestrator = &config.orchestrator;

        if orchestrator.max_history == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.max_history",
                "max_history must be greater than 0",
            ));
        } else if orchestrator.max_history < 4 {
            result.add_warning(ValidationWarning::new(
                "orchestrator.max_history",
                "max_history below 4 cannot hold a full tool-call round trip",
            ));
        }

        if orchestrator.sweep_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.sweep_interval_secs",
                "sweep_interval_secs must be greater than 0",
            ));
        }

        if orchestrator.session_ttl_secs < orchestrator.sweep_interval_secs {
            result.add_warning(ValidationWarning::new(
                "orchestrator.session_ttl_secs",
                "session_ttl_secs is shorter than sweep_interval_secs; sessions may outlive their TTL",
            ));
        }
    }

    fn validate_executor(config: &Config, result: &mut ValidationResult) {
        let executor = &config.executor;

        if executor.scroll_amount <= 0.0 {
            result.add_error(ValidationError::new(
                "executor.scroll_amount",
                "scroll_amount must be greater than 0",
            ));
        }

        if executor.max_excerpts == 0 {
            result.add_warning(ValidationWarning::new(
                "executor.max_excerpts",
                "max_excerpts is 0; find_text will return counts only",
            ));
        }

        if executor.settle_delay_ms > 5000 {
            result.add_warning(ValidationWarning::new(
                "executor.settle_delay_ms",
                "settle_delay_ms is very high (>5000); every click and fill waits this long",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) && !level.contains('=') {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }

        if config.logging.file && config.logging.dir.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.dir",
                "logging.dir cannot be empty when file logging is enabled",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
