//! Per-account figures derived from a node's transactions. Never persisted.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::model::CryptoType;
use crate::model::Node;
use crate::utils::format_fixed;

const SUMMARY_DECIMALS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub address: String,
    #[serde(rename = "type")]
    pub crypto_type: CryptoType,
    pub total_sent: f64,
    pub total_received: f64,
    pub balance: f64,
    pub transaction_count: usize,
    pub tags: Vec<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// A self-transfer counts as both sent and received. `transaction_count` is the
/// raw length of the node's sequence, duplicates included.
pub fn summarize(node: &Node) -> AccountSummary {
    let mut total_sent = 0.0;
    let mut total_received = 0.0;
    let mut last_activity: Option<DateTime<Utc>> = None;

    for tx in &node.transactions {
        let value = tx.value();
        if tx.from == node.id {
            total_sent += value;
        }
        if tx.to == node.id {
            total_received += value;
        }
        last_activity = Some(match last_activity {
            Some(current) if current >= tx.timestamp => current,
            _ => tx.timestamp,
        });
    }

    AccountSummary {
        address: node.id.clone(),
        crypto_type: node.crypto_type,
        total_sent,
        total_received,
        balance: total_received - total_sent,
        transaction_count: node.transactions.len(),
        tags: node.tags.clone(),
        last_activity,
    }
}

/// Summaries of every node that has transactions, busiest first. Ties keep the
/// order the nodes were given in.
pub fn summarize_all<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<AccountSummary> {
    let mut summaries: Vec<AccountSummary> =
        nodes.into_iter().filter(|node| !node.transactions.is_empty()).map(summarize).collect();
    // sort_by is stable
    summaries.sort_by(|a, b| b.transaction_count.cmp(&a.transaction_count));
    summaries
}

impl AccountSummary {
    pub fn display_amount(
        &self,
        value: f64,
    ) -> String {
        format!("{} {}", format_fixed(value, SUMMARY_DECIMALS), self.crypto_type.symbol())
    }
}

impl fmt::Display for AccountSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{} [{}]", self.address, self.crypto_type)?;
        writeln!(f, "  received: {}", self.display_amount(self.total_received))?;
        writeln!(f, "  sent:     {}", self.display_amount(self.total_sent))?;
        writeln!(f, "  balance:  {}", self.display_amount(self.balance))?;
        writeln!(f, "  txs:      {}", self.transaction_count)?;
        if !self.tags.is_empty() {
            writeln!(f, "  tags:     {}", self.tags.join(", "))?;
        }
        match self.last_activity {
            Some(at) => write!(f, "  last:     {}", at.to_rfc3339()),
            None => write!(f, "  last:     never"),
        }
    }
}
