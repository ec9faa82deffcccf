use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::TransactionSource;
use super::read_json;
use crate::Result;
use crate::config::EthereumProviderConfig;
use crate::constants::ETHEREUM_PROVIDER_KEY;
use crate::model::CryptoType;
use crate::model::Transaction;
use crate::normalizer;

#[derive(Debug, Clone)]
pub struct EtherscanExplorer {
    http_client: Client,
    api_url: Url,
    api_key: String,
    min_interval: Duration,
}

impl EtherscanExplorer {
    pub fn new(
        http_client: Client,
        config: &EthereumProviderConfig,
    ) -> Result<Self> {
        Ok(Self {
            http_client,
            api_url: config.validated_url()?,
            api_key: config.api_key.clone(),
            min_interval: config.min_interval(),
        })
    }
}

#[async_trait]
impl TransactionSource for EtherscanExplorer {
    fn key(&self) -> &'static str {
        ETHEREUM_PROVIDER_KEY
    }

    fn crypto_type(&self) -> CryptoType {
        CryptoType::Eth
    }

    fn min_interval(&self) -> Duration {
        self.min_interval
    }

    async fn fetch_raw(
        &self,
        address: &str,
    ) -> Result<Value> {
        debug!("etherscan_txlist::{}", address);
        let response = self
            .http_client
            .get(self.api_url.clone())
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "desc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await;
        read_json(ETHEREUM_PROVIDER_KEY, response).await
    }

    fn normalize(
        &self,
        raw: &Value,
        _address: &str,
    ) -> Result<Vec<Transaction>> {
        normalizer::eth::normalize(raw)
    }
}
