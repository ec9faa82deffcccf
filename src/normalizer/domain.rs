use std::net::IpAddr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::parse_payload;
use crate::Result;
use crate::constants::DOMAIN_PROVIDER_KEY;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::model::Transaction;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    page: Option<PageInfo>,
    #[serde(default)]
    task: Option<TaskInfo>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    ip: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskInfo {
    time: Option<String>,
}

/// urlscan search payload. Each scan that resolved the domain becomes a
/// domain -> ip pseudo transaction stamped with the scan time.
pub fn normalize(
    raw: &Value,
    domain: &str,
) -> Result<Vec<Transaction>> {
    let response: SearchResponse = parse_payload(raw, DOMAIN_PROVIDER_KEY)?;

    let mut transactions = Vec::with_capacity(response.results.len());
    for result in response.results {
        let Some(page) = result.page else {
            continue;
        };
        let Some(ip) = page.ip else {
            debug!("urlscan_result_without_ip::{}", domain);
            continue;
        };
        let ip: IpAddr = ip
            .parse()
            .map_err(|_| err_with_loc!(TraceError::upstream(DOMAIN_PROVIDER_KEY, format!("invalid ip {}", ip))))?;

        let scanned_at = result.task.and_then(|task| task.time).or(page.time).ok_or_else(|| {
            err_with_loc!(TraceError::upstream(DOMAIN_PROVIDER_KEY, format!("result for {} has no scan time", ip)))
        })?;
        let timestamp = DateTime::parse_from_rfc3339(&scanned_at)
            .map(|time| time.with_timezone(&Utc))
            .map_err(|e| {
                err_with_loc!(TraceError::upstream(
                    DOMAIN_PROVIDER_KEY,
                    format!("invalid scan time {}: {}", scanned_at, e)
                ))
            })?;

        transactions.push(Transaction::resolution(domain, ip, timestamp));
    }

    debug!("urlscan_normalized::domain::{}::count::{}", domain, transactions.len());
    Ok(transactions)
}
