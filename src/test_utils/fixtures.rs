use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;

use crate::model::CryptoType;
use crate::model::Node;
use crate::model::SessionMeta;
use crate::model::Transaction;

/// Test fixtures for creating consistent test data
pub struct TestFixtures;

impl TestFixtures {
    pub fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    /// ETH transfer without a hash, so repeated merges always count
    pub fn eth_tx(
        from: &str,
        to: &str,
        amount: &str,
    ) -> Transaction {
        Transaction::coin(from, to, amount, CryptoType::Eth, Self::ts(0), None)
    }

    pub fn eth_tx_at(
        from: &str,
        to: &str,
        amount: &str,
        secs: i64,
    ) -> Transaction {
        Transaction::coin(from, to, amount, CryptoType::Eth, Self::ts(secs), None)
    }

    pub fn hashed_eth_tx(
        from: &str,
        to: &str,
        amount: &str,
        hash: &str,
    ) -> Transaction {
        Transaction::coin(from, to, amount, CryptoType::Eth, Self::ts(0), Some(hash.to_string()))
    }

    pub fn btc_tx(
        from: &str,
        to: &str,
        amount: &str,
    ) -> Transaction {
        Transaction::coin(from, to, amount, CryptoType::Btc, Self::ts(0), None)
    }

    /// Node holding exactly the given transactions
    pub fn node_with(
        id: &str,
        transactions: Vec<Transaction>,
    ) -> Node {
        let mut node = Node::new(id, CryptoType::Eth, CryptoType::Eth.default_color());
        node.transactions = transactions;
        node
    }

    pub fn session_meta(
        id: &str,
        user_id: &str,
        secs: i64,
    ) -> SessionMeta {
        SessionMeta {
            id: id.to_string(),
            name: format!("session {}", id),
            user_id: user_id.to_string(),
            created: Self::ts(secs),
        }
    }
}
