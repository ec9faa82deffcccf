use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::constants::DEFAULT_BITCOIN_MIN_INTERVAL_MS;
use crate::constants::DEFAULT_BLOCKCHAIN_INFO_API_URL;
use crate::constants::DEFAULT_BTC_WINDOW;
use crate::constants::DEFAULT_DOMAIN_MIN_INTERVAL_MS;
use crate::constants::DEFAULT_ETHEREUM_MIN_INTERVAL_MS;
use crate::constants::DEFAULT_ETHERSCAN_API_URL;
use crate::constants::DEFAULT_URLSCAN_API_URL;
use crate::error::TraceError;

/// Each section is optional. A provider without a section is reported as
/// `ConfigMissing` when it is first needed, not at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub ethereum: Option<EthereumProviderConfig>,
    pub bitcoin: Option<BitcoinProviderConfig>,
    pub urlscan: Option<UrlscanProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumProviderConfig {
    pub api_url: String,
    pub api_key: String,
    pub explorer_url: String,
    pub min_interval_ms: u64,
}

impl Default for EthereumProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ETHERSCAN_API_URL.to_string(),
            api_key: String::new(),
            explorer_url: "https://etherscan.io".to_string(),
            min_interval_ms: DEFAULT_ETHEREUM_MIN_INTERVAL_MS,
        }
    }
}

impl EthereumProviderConfig {
    pub fn validated_url(&self) -> Result<Url, TraceError> {
        if self.api_key.trim().is_empty() {
            return Err(TraceError::ConfigMissing("providers.ethereum.api_key".to_string()));
        }
        parse_api_url("providers.ethereum.api_url", &self.api_url)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcoinProviderConfig {
    pub api_url: String,
    pub explorer_url: String,
    pub min_interval_ms: u64,
    pub max_transactions: usize,
}

impl Default for BitcoinProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BLOCKCHAIN_INFO_API_URL.to_string(),
            explorer_url: "https://www.blockchain.com/explorer".to_string(),
            min_interval_ms: DEFAULT_BITCOIN_MIN_INTERVAL_MS,
            max_transactions: DEFAULT_BTC_WINDOW,
        }
    }
}

impl BitcoinProviderConfig {
    pub fn validated_url(&self) -> Result<Url, TraceError> {
        parse_api_url("providers.bitcoin.api_url", &self.api_url)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlscanProviderConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub min_interval_ms: u64,
}

impl Default for UrlscanProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_URLSCAN_API_URL.to_string(),
            api_key: None,
            min_interval_ms: DEFAULT_DOMAIN_MIN_INTERVAL_MS,
        }
    }
}

impl UrlscanProviderConfig {
    pub fn validated_url(&self) -> Result<Url, TraceError> {
        parse_api_url("providers.urlscan.api_url", &self.api_url)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

fn parse_api_url(
    key: &str,
    value: &str,
) -> Result<Url, TraceError> {
    if value.trim().is_empty() {
        return Err(TraceError::ConfigMissing(key.to_string()));
    }
    Url::parse(value.trim()).map_err(|e| TraceError::ConfigMissing(format!("{} ({})", key, e)))
}
