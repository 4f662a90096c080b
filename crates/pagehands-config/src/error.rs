//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// A `${VAR}` reference names an unset variable.
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mentions_path() {
        let err = ConfigError::NotFound("/etc/pagehands.toml".to_string());
        assert_eq!(err.to_string(), "Config file not found: /etc/pagehands.toml");
    }

    #[test]
    fn test_unknown_provider_names_tag() {
        let err = ConfigError::UnknownProvider("gemini".to_string());
        assert!(err.to_string().ends_with("gemini"));
    }

    #[test]
    fn test_toml_error_converts() {
        let parse = toml::from_str::<toml::Value>("key = [").unwrap_err();
        let err = ConfigError::from(parse);
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
