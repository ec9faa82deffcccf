use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::TransactionSource;
use super::read_json;
use crate::Result;
use crate::config::BitcoinProviderConfig;
use crate::constants::BITCOIN_PROVIDER_KEY;
use crate::model::CryptoType;
use crate::model::Transaction;
use crate::normalizer;

#[derive(Debug, Clone)]
pub struct BlockchainInfoExplorer {
    http_client: Client,
    api_url: Url,
    min_interval: Duration,
    window: usize,
}

impl BlockchainInfoExplorer {
    pub fn new(
        http_client: Client,
        config: &BitcoinProviderConfig,
    ) -> Result<Self> {
        Ok(Self {
            http_client,
            api_url: config.validated_url()?,
            min_interval: config.min_interval(),
            window: config.max_transactions,
        })
    }

    fn rawaddr_url(
        &self,
        address: &str,
    ) -> String {
        format!(
            "{}/rawaddr/{}",
            self.api_url.as_str().trim_end_matches('/'),
            urlencoding::encode(address)
        )
    }
}

#[async_trait]
impl TransactionSource for BlockchainInfoExplorer {
    fn key(&self) -> &'static str {
        BITCOIN_PROVIDER_KEY
    }

    fn crypto_type(&self) -> CryptoType {
        CryptoType::Btc
    }

    fn min_interval(&self) -> Duration {
        self.min_interval
    }

    async fn fetch_raw(
        &self,
        address: &str,
    ) -> Result<Value> {
        let url = self.rawaddr_url(address);
        debug!("blockchain_info_rawaddr::{}", url);
        let response = self.http_client.get(&url).send().await;
        read_json(BITCOIN_PROVIDER_KEY, response).await
    }

    fn normalize(
        &self,
        raw: &Value,
        address: &str,
    ) -> Result<Vec<Transaction>> {
        normalizer::btc::normalize(raw, address, self.window)
    }
}
