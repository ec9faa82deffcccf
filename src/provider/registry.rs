use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::info;
use tracing::warn;

use super::BlockchainInfoExplorer;
use super::EtherscanExplorer;
use super::TransactionSource;
use super::UrlscanExplorer;
use crate::Result;
use crate::config::ProvidersConfig;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::gate::RequestGate;
use crate::model::CryptoType;
use crate::model::Transaction;

/// Routes a fetch to the source registered for a crypto type, through the
/// shared request gate.
#[derive(Clone)]
pub struct ProviderRegistry {
    gate: RequestGate,
    sources: HashMap<CryptoType, Arc<dyn TransactionSource>>,
    // Why a source is unavailable, reported on first use
    missing: HashMap<CryptoType, String>,
    explorers: HashMap<CryptoType, String>,
}

impl ProviderRegistry {
    pub fn new(gate: RequestGate) -> Self {
        Self {
            gate,
            sources: HashMap::new(),
            missing: HashMap::new(),
            explorers: HashMap::new(),
        }
    }

    /// Builds the HTTP sources from config. A section that is absent or invalid
    /// does not fail construction, the crypto type just reports `ConfigMissing`.
    pub fn from_config(
        config: &ProvidersConfig,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder().timeout(request_timeout).build()?;
        let mut registry = Self::new(RequestGate::new());

        if let Some(section) = &config.ethereum {
            registry.explorers.insert(CryptoType::Eth, section.explorer_url.clone());
        }
        if let Some(section) = &config.bitcoin {
            registry.explorers.insert(CryptoType::Btc, section.explorer_url.clone());
        }

        match &config.ethereum {
            Some(section) => match EtherscanExplorer::new(http_client.clone(), section) {
                Ok(source) => registry.register(Arc::new(source)),
                Err(e) => registry.mark_missing(CryptoType::Eth, unavailable_reason(&e)),
            },
            None => registry.mark_missing(CryptoType::Eth, "providers.ethereum".to_string()),
        }
        match &config.bitcoin {
            Some(section) => match BlockchainInfoExplorer::new(http_client.clone(), section) {
                Ok(source) => registry.register(Arc::new(source)),
                Err(e) => registry.mark_missing(CryptoType::Btc, unavailable_reason(&e)),
            },
            None => registry.mark_missing(CryptoType::Btc, "providers.bitcoin".to_string()),
        }
        match &config.urlscan {
            Some(section) => match UrlscanExplorer::new(http_client, section) {
                Ok(source) => registry.register(Arc::new(source)),
                Err(e) => registry.mark_missing(CryptoType::Domain, unavailable_reason(&e)),
            },
            None => registry.mark_missing(CryptoType::Domain, "providers.urlscan".to_string()),
        }

        Ok(registry)
    }

    pub fn register(
        &mut self,
        source: Arc<dyn TransactionSource>,
    ) {
        let crypto_type = source.crypto_type();
        info!("provider_registered::{}::{}", crypto_type, source.key());
        self.missing.remove(&crypto_type);
        self.sources.insert(crypto_type, source);
    }

    fn mark_missing(
        &mut self,
        crypto_type: CryptoType,
        reason: String,
    ) {
        warn!("provider_unavailable::{}::{}", crypto_type, reason);
        self.missing.insert(crypto_type, reason);
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Block explorer page for a transaction. Domain resolutions and hash-less
    /// transactions have none.
    pub fn transaction_link(
        &self,
        tx: &Transaction,
    ) -> Option<String> {
        let hash = tx.hash.as_deref()?;
        let base = self.explorers.get(&tx.currency)?.trim_end_matches('/');
        match tx.currency {
            CryptoType::Eth => Some(format!("{}/tx/{}", base, hash)),
            CryptoType::Btc => Some(format!("{}/transactions/btc/{}", base, hash)),
            CryptoType::Domain => None,
        }
    }

    fn source(
        &self,
        crypto_type: CryptoType,
    ) -> Result<&Arc<dyn TransactionSource>> {
        self.sources.get(&crypto_type).ok_or_else(|| {
            let reason = self
                .missing
                .get(&crypto_type)
                .cloned()
                .unwrap_or_else(|| format!("no provider for {}", crypto_type));
            err_with_loc!(TraceError::ConfigMissing(reason))
        })
    }

    /// Throttled fetch plus normalization. Nothing is returned unless the whole
    /// batch normalized cleanly.
    pub async fn fetch_transactions(
        &self,
        address: &str,
        crypto_type: CryptoType,
    ) -> Result<Vec<Transaction>> {
        let source = self.source(crypto_type)?.clone();
        let raw = self
            .gate
            .enqueue(source.key(), source.min_interval(), || source.fetch_raw(address))
            .await?;
        let transactions = source.normalize(&raw, address)?;
        info!("provider_fetched::{}::{}::{}", source.key(), address, transactions.len());
        Ok(transactions)
    }
}

fn unavailable_reason(err: &anyhow::Error) -> String {
    match TraceError::kind_of(err) {
        Some(TraceError::ConfigMissing(reason)) => reason.clone(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::config::BitcoinProviderConfig;
    use crate::config::EthereumProviderConfig;
    use crate::provider::MockTransactionSource;

    fn mock_source(crypto_type: CryptoType) -> MockTransactionSource {
        let mut source = MockTransactionSource::new();
        source.expect_crypto_type().return_const(crypto_type);
        source.expect_key().return_const("ethereum");
        source.expect_min_interval().return_const(Duration::from_millis(0));
        source
    }

    #[tokio::test]
    async fn missing_section_is_config_missing() {
        let registry = ProviderRegistry::from_config(
            &ProvidersConfig {
                bitcoin: Some(BitcoinProviderConfig::default()),
                ..Default::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();

        let err = registry.fetch_transactions("0xabc", CryptoType::Eth).await.unwrap_err();
        assert_eq!(
            TraceError::kind_of(&err),
            Some(&TraceError::ConfigMissing("providers.ethereum".to_string()))
        );
    }

    #[tokio::test]
    async fn empty_api_key_is_config_missing() {
        let registry = ProviderRegistry::from_config(
            &ProvidersConfig {
                ethereum: Some(EthereumProviderConfig::default()),
                ..Default::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();

        let err = registry.fetch_transactions("0xabc", CryptoType::Eth).await.unwrap_err();
        assert_eq!(
            TraceError::kind_of(&err),
            Some(&TraceError::ConfigMissing("providers.ethereum.api_key".to_string()))
        );
    }

    #[tokio::test]
    async fn fetch_goes_through_the_registered_source() {
        let mut source = mock_source(CryptoType::Eth);
        source.expect_fetch_raw().times(1).returning(|_| Ok(json!({"status": "1"})));
        source.expect_normalize().times(1).returning(|_, address| {
            Ok(vec![Transaction::coin(
                address,
                "0xb",
                "1.0000",
                CryptoType::Eth,
                Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                None,
            )])
        });

        let mut registry = ProviderRegistry::new(RequestGate::new());
        registry.register(Arc::new(source));

        let transactions = registry.fetch_transactions("0xa", CryptoType::Eth).await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].from, "0xa");
        assert!(registry.gate().last_dispatch("ethereum").await.is_some());
    }

    #[test]
    fn links_point_at_the_configured_explorer() {
        let registry = ProviderRegistry::from_config(
            &ProvidersConfig {
                ethereum: Some(EthereumProviderConfig::default()),
                bitcoin: Some(BitcoinProviderConfig::default()),
                ..Default::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let eth = Transaction::coin("0xa", "0xb", "1.0000", CryptoType::Eth, at, Some("0xfeed".to_string()));
        assert_eq!(registry.transaction_link(&eth).as_deref(), Some("https://etherscan.io/tx/0xfeed"));

        let btc = Transaction::coin("1A", "1B", "0.10000000", CryptoType::Btc, at, Some("beef".to_string()));
        assert_eq!(
            registry.transaction_link(&btc).as_deref(),
            Some("https://www.blockchain.com/explorer/transactions/btc/beef")
        );

        let unhashed = Transaction::coin("0xa", "0xb", "1.0000", CryptoType::Eth, at, None);
        assert_eq!(registry.transaction_link(&unhashed), None);
    }

    #[tokio::test]
    async fn normalize_failure_propagates() {
        let mut source = mock_source(CryptoType::Eth);
        source.expect_fetch_raw().returning(|_| Ok(json!({})));
        source
            .expect_normalize()
            .returning(|_, _| Err(anyhow::anyhow!(TraceError::upstream("ethereum", "NOTOK: Invalid API Key"))));

        let mut registry = ProviderRegistry::new(RequestGate::new());
        registry.register(Arc::new(source));

        let err = registry.fetch_transactions("0xa", CryptoType::Eth).await.unwrap_err();
        assert_eq!(
            TraceError::kind_of(&err),
            Some(&TraceError::upstream("ethereum", "NOTOK: Invalid API Key"))
        );
    }
}
