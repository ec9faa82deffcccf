use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::error::TraceError;
use crate::model::CryptoType;
use crate::model::Transaction;
use crate::provider::TransactionSource;

/// Source serving canned batches per address. Unknown addresses get an empty
/// batch, addresses marked as failing get an upstream error.
#[derive(Debug, Clone)]
pub struct StaticSource {
    key: &'static str,
    crypto_type: CryptoType,
    min_interval: Duration,
    batches: HashMap<String, Vec<Transaction>>,
    failing: HashMap<String, TraceError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticSource {
    pub fn new(crypto_type: CryptoType) -> Self {
        let key = match crypto_type {
            CryptoType::Eth => "ethereum",
            CryptoType::Btc => "bitcoin",
            CryptoType::Domain => "domain",
        };
        Self {
            key,
            crypto_type,
            min_interval: Duration::ZERO,
            batches: HashMap::new(),
            failing: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_batch(
        mut self,
        address: &str,
        batch: Vec<Transaction>,
    ) -> Self {
        self.batches.insert(address.to_string(), batch);
        self
    }

    pub fn failing_with(
        mut self,
        address: &str,
        err: TraceError,
    ) -> Self {
        self.failing.insert(address.to_string(), err);
        self
    }

    pub fn with_min_interval(
        mut self,
        min_interval: Duration,
    ) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Addresses fetched so far, in dispatch order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSource for StaticSource {
    fn key(&self) -> &'static str {
        self.key
    }

    fn crypto_type(&self) -> CryptoType {
        self.crypto_type
    }

    fn min_interval(&self) -> Duration {
        self.min_interval
    }

    async fn fetch_raw(
        &self,
        address: &str,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(address.to_string());
        if let Some(err) = self.failing.get(address) {
            return Err(anyhow::anyhow!(err.clone()));
        }
        let batch = self.batches.get(address).cloned().unwrap_or_default();
        Ok(serde_json::to_value(batch)?)
    }

    fn normalize(
        &self,
        raw: &Value,
        _address: &str,
    ) -> Result<Vec<Transaction>> {
        Ok(serde_json::from_value(raw.clone())?)
    }
}
