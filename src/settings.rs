//! File-backed provider settings.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use pagehands_config::ProviderConfig;
use pagehands_runtime::{SettingsError, SettingsStore};

/// Stores the provider settings as a TOML file.
///
/// Until the first save, `load` returns the provider section of the startup
/// configuration.
pub struct FileSettingsStore {
    path: PathBuf,
    fallback: ProviderConfig,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>, fallback: ProviderConfig) -> Self {
        Self {
            path: path.into(),
            fallback,
        }
    }

    /// `~/.pagehands/settings.toml`.
    pub fn default_path() -> PathBuf {
        crate::pagehands_dir().join("settings.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<ProviderConfig, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                debug!(path = %self.path.display(), "Loaded provider settings");
                toml::from_str(&content).map_err(|e| {
                    SettingsError::Storage(format!("Invalid settings file {}: {}", self.path.display(), e))
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(self.fallback.clone()),
            Err(e) => Err(SettingsError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| SettingsError::Storage(format!("Failed to encode settings: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| SettingsError::Storage(format!("Failed to write {}: {}", self.path.display(), e)))?;

        info!(path = %self.path.display(), provider = %config.provider, "Saved provider settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_returns_fallback() {
        let dir = TempDir::new().unwrap();
        let fallback = ProviderConfig::for_provider("local");
        let store = FileSettingsStore::new(dir.path().join("settings.toml"), fallback.clone());

        assert_eq!(store.load().await.unwrap(), fallback);
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let store = FileSettingsStore::new(&path, ProviderConfig::default());

        let config = ProviderConfig::for_provider("anthropic")
            .with_api_key("sk-ant-123456789")
            .with_model("claude-custom");
        store.save(&config).await.unwrap();
        assert!(path.exists());

        let reopened = FileSettingsStore::new(&path, ProviderConfig::default());
        assert_eq!(reopened.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "provider = [oops").unwrap();

        let store = FileSettingsStore::new(&path, ProviderConfig::default());
        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }
}
