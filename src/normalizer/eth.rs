use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use super::parse_payload;
use crate::Result;
use crate::constants::ETH_DECIMALS;
use crate::constants::ETHEREUM_PROVIDER_KEY;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::model::CryptoType;
use crate::model::Transaction;
use crate::utils::format_fixed;
use crate::utils::wei_to_eth;

const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    #[serde(default)]
    message: String,
    // A list on success, an explanation string on failure
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEthTransaction {
    hash: String,
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    contract_address: String,
    value: String,
    time_stamp: String,
}

/// Etherscan `txlist` payload. Direction is taken as reported.
pub fn normalize(raw: &Value) -> Result<Vec<Transaction>> {
    let response: TxListResponse = parse_payload(raw, ETHEREUM_PROVIDER_KEY)?;

    if response.status != "1" {
        let detail = response.result.as_str().unwrap_or_default();
        if response.message == NO_TRANSACTIONS_MESSAGE {
            debug!("etherscan_no_transactions");
            return Ok(Vec::new());
        }
        if detail.to_lowercase().contains("rate limit") {
            return Err(err_with_loc!(TraceError::rate_limited(ETHEREUM_PROVIDER_KEY)));
        }
        let message = if response.message.is_empty() {
            "Failed to fetch Ethereum transactions".to_string()
        } else if detail.is_empty() {
            response.message
        } else {
            format!("{}: {}", response.message, detail)
        };
        return Err(err_with_loc!(TraceError::upstream(ETHEREUM_PROVIDER_KEY, message)));
    }

    let raw_transactions: Vec<RawEthTransaction> = parse_payload(&response.result, ETHEREUM_PROVIDER_KEY)?;
    let mut transactions = Vec::with_capacity(raw_transactions.len());
    for raw_tx in raw_transactions {
        // Contract creations report an empty `to`
        let to = if raw_tx.to.is_empty() { raw_tx.contract_address } else { raw_tx.to };
        if to.is_empty() {
            warn!("etherscan_transaction_without_recipient::{}", raw_tx.hash);
            continue;
        }

        let amount = wei_to_eth(&raw_tx.value).ok_or_else(|| {
            err_with_loc!(TraceError::upstream(
                ETHEREUM_PROVIDER_KEY,
                format!("invalid value {} in {}", raw_tx.value, raw_tx.hash)
            ))
        })?;
        let timestamp = parse_unix_seconds(&raw_tx.time_stamp).ok_or_else(|| {
            err_with_loc!(TraceError::upstream(
                ETHEREUM_PROVIDER_KEY,
                format!("invalid timeStamp {} in {}", raw_tx.time_stamp, raw_tx.hash)
            ))
        })?;

        transactions.push(Transaction::coin(
            raw_tx.from,
            to,
            format_fixed(amount, ETH_DECIMALS),
            CryptoType::Eth,
            timestamp,
            Some(raw_tx.hash),
        ));
    }

    debug!("etherscan_normalized::count::{}", transactions.len());
    Ok(transactions)
}

fn parse_unix_seconds(value: &str) -> Option<DateTime<Utc>> {
    let seconds = value.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0)
}
