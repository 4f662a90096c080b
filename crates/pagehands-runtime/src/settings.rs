//! Provider settings storage.

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use pagehands_config::ProviderConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings storage error: {0}")]
    Storage(String),
}

/// Key-value store holding the provider configuration.
///
/// The host supplies the persistent implementation; [`MemorySettingsStore`]
/// keeps settings for the lifetime of the process.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<ProviderConfig, SettingsError>;

    async fn save(&self, config: &ProviderConfig) -> Result<(), SettingsError>;
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemorySettingsStore {
    config: RwLock<ProviderConfig>,
}

impl MemorySettingsStore {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<ProviderConfig, SettingsError> {
        Ok(self.config.read().clone())
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), SettingsError> {
        *self.config.write() = config.clone();
        Ok(())
    }
}
