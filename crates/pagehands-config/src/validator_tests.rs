use super::*;
use crate::schema::ProviderConfig;

fn configured() -> Config {
    let mut config = Config::default();
    config.provider = ProviderConfig::for_provider("openai").with_api_key("sk-test-key-1234");
    config
}

#[test]
fn test_validate_configured_config() {
    let result = ConfigValidator::validate(&configured()).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_default_config_warns_missing_key() {
    let result = ConfigValidator::validate(&Config::default()).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "provider.api_key"));
}

#[test]
fn test_validate_local_without_key() {
    let mut config = Config::default();
    config.provider = ProviderConfig::for_provider("local");
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_unknown_provider() {
    let mut config = configured();
    config.provider.provider = "gemini".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "provider.provider"));
}

#[test]
fn test_validate_invalid_base_url() {
    let mut config = configured();
    config.provider.base_url = Some("api.openai.com".to_string());
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "provider.base_url"));
}

#[test]
fn test_validate_zero_timeout() {
    let mut config = configured();
    config.provider.timeout_ms = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "provider.timeout_ms"));
}

#[test]
fn test_validate_temperature_range() {
    let mut config = configured();
    config.provider.temperature = 3.5;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "provider.temperature"));
}

#[test]
fn test_validate_high_retries_warning() {
    let mut config = configured();
    config.provider.max_retries = 20;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "provider.max_retries"));
}

#[test]
fn test_validate_zero_history() {
    let mut config = configured();
    config.orchestrator.max_history = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "orchestrator.max_history"));
}

#[test]
fn test_validate_ttl_shorter_than_sweep() {
    let mut config = configured();
    config.orchestrator.session_ttl_secs = 60;
    config.orchestrator.sweep_interval_secs = 300;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "orchestrator.session_ttl_secs"));
}

#[test]
fn test_validate_negative_scroll_amount() {
    let mut config = configured();
    config.executor.scroll_amount = -10.0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "executor.scroll_amount"));
}

#[test]
fn test_validate_log_level_directive_accepted() {
    let mut config = configured();
    config.logging.level = "pagehands_runtime=debug".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.warnings.is_empty());

    config.logging.level = "verbose".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.warnings.iter().any(|w| w.path == "logging.level"));
}
