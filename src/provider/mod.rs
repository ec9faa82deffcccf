pub mod blockchain_info;
pub mod etherscan;
pub mod registry;
pub mod urlscan;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use reqwest::StatusCode;
use serde_json::Value;

pub use blockchain_info::BlockchainInfoExplorer;
pub use etherscan::EtherscanExplorer;
pub use registry::ProviderRegistry;
pub use urlscan::UrlscanExplorer;

use crate::Result;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::model::CryptoType;
use crate::model::Transaction;

/// One upstream transaction source. The core only relies on `normalize`'s output;
/// `fetch_raw` is free to talk to whatever endpoint it wants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Rate gate key, one lane per upstream service
    fn key(&self) -> &'static str;

    fn crypto_type(&self) -> CryptoType;

    fn min_interval(&self) -> Duration;

    async fn fetch_raw(
        &self,
        address: &str,
    ) -> Result<Value>;

    fn normalize(
        &self,
        raw: &Value,
        address: &str,
    ) -> Result<Vec<Transaction>>;
}

/// Shared response handling: 429 is a rate limit, any other failure status or an
/// unreadable body is an upstream error.
pub(crate) async fn read_json(
    provider: &str,
    response: std::result::Result<Response, reqwest::Error>,
) -> Result<Value> {
    let response =
        response.map_err(|e| err_with_loc!(TraceError::upstream(provider, format!("request failed: {}", e))))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(err_with_loc!(TraceError::rate_limited(provider)));
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_else(|_| "<failed to read response text>".to_string());
        return Err(err_with_loc!(TraceError::upstream(provider, format!("{} - {}", status, text))));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| err_with_loc!(TraceError::upstream(provider, format!("invalid json: {}", e))))
}
