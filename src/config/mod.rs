pub mod log;
pub mod provider;
pub mod storage;
pub mod tracker;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use toml;
use tracing::debug;

pub use log::LoggingConfig;
pub use provider::BitcoinProviderConfig;
pub use provider::EthereumProviderConfig;
pub use provider::ProvidersConfig;
pub use provider::UrlscanProviderConfig;
pub use storage::StorageRedisConfig;
pub use tracker::TrackerConfig;

use crate::error::ConfigError;

pub const ETHERSCAN_API_KEY_ENV: &str = "FUNDTRACE_ETHERSCAN_API_KEY";
pub const URLSCAN_API_KEY_ENV: &str = "FUNDTRACE_URLSCAN_API_KEY";
pub const REDIS_HOST_ENV: &str = "FUNDTRACE_REDIS_HOST";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub storage_redis: StorageRedisConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Environment wins over the file for secrets and hosts
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ETHERSCAN_API_KEY_ENV) {
            debug!("config_override::{}", ETHERSCAN_API_KEY_ENV);
            self.providers.ethereum.get_or_insert_with(Default::default).api_key = key;
        }
        if let Ok(key) = std::env::var(URLSCAN_API_KEY_ENV) {
            debug!("config_override::{}", URLSCAN_API_KEY_ENV);
            self.providers.urlscan.get_or_insert_with(Default::default).api_key = Some(key);
        }
        if let Ok(host) = std::env::var(REDIS_HOST_ENV) {
            debug!("config_override::{}", REDIS_HOST_ENV);
            self.storage_redis.host = host;
        }
    }
}

/// Read a TOML config file, then apply `.env` and environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> crate::Result<Config> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::OpenFileError {
        path: path.display().to_string(),
        source,
    })?;
    let mut config = Config::from_toml(&config_str)?;

    // A missing .env file is normal
    let _ = dotenvy::dotenv();
    config.apply_env_overrides();
    Ok(config)
}
