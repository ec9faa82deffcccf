use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::TransactionSource;
use super::read_json;
use crate::Result;
use crate::config::UrlscanProviderConfig;
use crate::constants::DOMAIN_PROVIDER_KEY;
use crate::model::CryptoType;
use crate::model::Transaction;
use crate::normalizer;

#[derive(Debug, Clone)]
pub struct UrlscanExplorer {
    http_client: Client,
    api_url: Url,
    api_key: Option<String>,
    min_interval: Duration,
}

impl UrlscanExplorer {
    pub fn new(
        http_client: Client,
        config: &UrlscanProviderConfig,
    ) -> Result<Self> {
        Ok(Self {
            http_client,
            api_url: config.validated_url()?,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            min_interval: config.min_interval(),
        })
    }
}

#[async_trait]
impl TransactionSource for UrlscanExplorer {
    fn key(&self) -> &'static str {
        DOMAIN_PROVIDER_KEY
    }

    fn crypto_type(&self) -> CryptoType {
        CryptoType::Domain
    }

    fn min_interval(&self) -> Duration {
        self.min_interval
    }

    async fn fetch_raw(
        &self,
        domain: &str,
    ) -> Result<Value> {
        debug!("urlscan_search::{}", domain);
        let query = format!("domain:{}", domain);
        let mut request = self.http_client.get(self.api_url.clone()).query(&[("q", query.as_str())]);
        if let Some(api_key) = &self.api_key {
            request = request.header("API-Key", api_key);
        }
        read_json(DOMAIN_PROVIDER_KEY, request.send().await).await
    }

    fn normalize(
        &self,
        raw: &Value,
        domain: &str,
    ) -> Result<Vec<Transaction>> {
        normalizer::domain::normalize(raw, domain)
    }
}
