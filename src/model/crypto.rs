use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::BTC_DECIMALS;
use crate::constants::BTC_NODE_COLOR;
use crate::constants::DOMAIN_NODE_COLOR;
use crate::constants::ETH_DECIMALS;
use crate::constants::ETH_NODE_COLOR;
use crate::error::TraceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum CryptoType {
    #[serde(rename = "BTC", alias = "btc")]
    Btc,
    #[serde(rename = "ETH", alias = "eth")]
    Eth,
    #[serde(rename = "DOMAIN", alias = "domain")]
    Domain,
}

impl CryptoType {
    pub fn symbol(&self) -> &'static str {
        match self {
            CryptoType::Btc => "BTC",
            CryptoType::Eth => "ETH",
            CryptoType::Domain => "DOMAIN",
        }
    }

    pub fn default_color(&self) -> &'static str {
        match self {
            CryptoType::Btc => BTC_NODE_COLOR,
            CryptoType::Eth => ETH_NODE_COLOR,
            CryptoType::Domain => DOMAIN_NODE_COLOR,
        }
    }

    /// Display precision of amounts, `None` for domain lookups which carry no value
    pub fn decimals(&self) -> Option<usize> {
        match self {
            CryptoType::Btc => Some(BTC_DECIMALS),
            CryptoType::Eth => Some(ETH_DECIMALS),
            CryptoType::Domain => None,
        }
    }

    /// Canonical form of a user supplied address: ETH hex addresses are case-insensitive,
    /// bitcoin addresses and domains are kept as typed.
    pub fn normalize_address(
        &self,
        address: &str,
    ) -> String {
        let address = address.trim();
        match self {
            CryptoType::Eth => address.to_lowercase(),
            CryptoType::Btc | CryptoType::Domain => address.to_string(),
        }
    }
}

impl fmt::Display for CryptoType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CryptoType {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(CryptoType::Btc),
            "ETH" => Ok(CryptoType::Eth),
            "DOMAIN" => Ok(CryptoType::Domain),
            other => Err(TraceError::ValidationError(format!("unknown crypto type: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("eth", CryptoType::Eth)]
    #[case("BTC", CryptoType::Btc)]
    #[case(" Domain ", CryptoType::Domain)]
    fn parses_case_insensitively(
        #[case] input: &str,
        #[case] expected: CryptoType,
    ) {
        assert_eq!(input.parse::<CryptoType>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_types() {
        assert!(matches!("doge".parse::<CryptoType>(), Err(TraceError::ValidationError(_))));
    }

    #[test]
    fn serde_uses_upper_case_symbols_and_accepts_lower_case() {
        assert_eq!(serde_json::to_string(&CryptoType::Domain).unwrap(), "\"DOMAIN\"");
        assert_eq!(serde_json::from_str::<CryptoType>("\"domain\"").unwrap(), CryptoType::Domain);
    }

    #[test]
    fn only_eth_addresses_are_lower_cased() {
        assert_eq!(CryptoType::Eth.normalize_address(" 0xABcd "), "0xabcd");
        assert_eq!(CryptoType::Btc.normalize_address("1BoatSLRHtKNngkdXEeobR76b53LETtpyT"), "1BoatSLRHtKNngkdXEeobR76b53LETtpyT");
    }
}
