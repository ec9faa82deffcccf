use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::parse_payload;
use crate::Result;
use crate::constants::BITCOIN_PROVIDER_KEY;
use crate::constants::BTC_DECIMALS;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::model::CryptoType;
use crate::model::Transaction;
use crate::utils::format_fixed;
use crate::utils::satoshi_to_btc;

/// Counterparty used when a spending input has no previous output (coinbase)
pub const COINBASE_SENDER: &str = "coinbase";

#[derive(Debug, Deserialize)]
struct RawAddrResponse {
    #[serde(default)]
    txs: Vec<RawBtcTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawBtcTransaction {
    hash: String,
    time: i64,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    out: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    prev_out: Option<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    addr: Option<String>,
    #[serde(default)]
    value: u64,
}

/// blockchain.info `rawaddr` payload, keeping at most `window` of the most recent
/// transactions. A transaction paying `address` in any output is incoming.
pub fn normalize(
    raw: &Value,
    address: &str,
    window: usize,
) -> Result<Vec<Transaction>> {
    let response: RawAddrResponse = parse_payload(raw, BITCOIN_PROVIDER_KEY)?;

    let mut transactions = Vec::with_capacity(window.min(response.txs.len()));
    for raw_tx in response.txs.into_iter().take(window) {
        let timestamp = DateTime::from_timestamp(raw_tx.time, 0).ok_or_else(|| {
            err_with_loc!(TraceError::upstream(
                BITCOIN_PROVIDER_KEY,
                format!("invalid time {} in {}", raw_tx.time, raw_tx.hash)
            ))
        })?;

        let incoming = raw_tx.out.iter().find(|output| output.addr.as_deref() == Some(address));
        let (from, to, satoshi) = match incoming {
            Some(output) => {
                let sender = raw_tx
                    .inputs
                    .first()
                    .and_then(|input| input.prev_out.as_ref())
                    .and_then(|prev| prev.addr.clone())
                    .unwrap_or_else(|| COINBASE_SENDER.to_string());
                (sender, address.to_string(), output.value)
            },
            None => {
                let Some(output) = raw_tx.out.iter().find(|output| output.addr.is_some()) else {
                    debug!("btc_transaction_without_addressed_output::{}", raw_tx.hash);
                    continue;
                };
                (address.to_string(), output.addr.clone().unwrap_or_default(), output.value)
            },
        };

        transactions.push(Transaction::coin(
            from,
            to,
            format_fixed(satoshi_to_btc(satoshi), BTC_DECIMALS),
            CryptoType::Btc,
            timestamp,
            Some(raw_tx.hash),
        ));
    }

    debug!("blockchain_info_normalized::address::{}::count::{}", address, transactions.len());
    Ok(transactions)
}
