use std::fmt;
use std::net::IpAddr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::CryptoType;

/// What moved along a transaction: a coin amount, or for domain lookups the address
/// the domain resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransferAmount {
    // Tried first: "1.0000" is not an IP, "10.0.0.1" is not a decimal
    Resolved(IpAddr),
    Coin(String),
}

impl TransferAmount {
    /// Numeric value for aggregation. Resolutions carry no value.
    pub fn value(&self) -> f64 {
        match self {
            TransferAmount::Coin(amount) => amount.trim().parse::<f64>().unwrap_or(0.0),
            TransferAmount::Resolved(_) => 0.0,
        }
    }
}

impl fmt::Display for TransferAmount {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TransferAmount::Coin(amount) => f.write_str(amount),
            TransferAmount::Resolved(ip) => write!(f, "{}", ip),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    #[serde(alias = "value")]
    pub amount: TransferAmount,
    pub currency: CryptoType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Transaction {
    pub fn coin(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: impl Into<String>,
        currency: CryptoType,
        timestamp: DateTime<Utc>,
        hash: Option<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount: TransferAmount::Coin(amount.into()),
            currency,
            timestamp,
            hash,
        }
    }

    pub fn resolution(
        domain: impl Into<String>,
        ip: IpAddr,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            from: domain.into(),
            to: ip.to_string(),
            amount: TransferAmount::Resolved(ip),
            currency: CryptoType::Domain,
            timestamp,
            hash: None,
        }
    }

    pub fn value(&self) -> f64 {
        self.amount.value()
    }
}
