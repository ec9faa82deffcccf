use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::CryptoType;
use super::Edge;
use super::Node;
use super::Transaction;

/// Identity of a session, independent of its graph contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created: DateTime<Utc>,
}

/// Edge as found in a stored document. Older documents may hold one raw entry
/// per transaction with missing aggregate fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub currency: Option<CryptoType>,
}

impl From<&Edge> for StoredEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            from: edge.from.clone(),
            to: edge.to.clone(),
            amount: edge.amount,
            count: Some(edge.count),
            label: Some(edge.label.clone()),
            currency: Some(edge.currency),
        }
    }
}

/// Full persisted document, always written and read whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<StoredEdge>,
    #[serde(default)]
    pub last_transactions: Vec<Transaction>,
}

impl SessionDocument {
    pub fn empty(meta: &SessionMeta) -> Self {
        Self {
            id: meta.id.clone(),
            name: meta.name.clone(),
            user_id: meta.user_id.clone(),
            created: meta.created,
            last_modified: meta.created,
            nodes: Vec::new(),
            edges: Vec::new(),
            last_transactions: Vec::new(),
        }
    }

    pub fn meta(&self) -> SessionMeta {
        SessionMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            user_id: self.user_id.clone(),
            created: self.created,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created: self.created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
}
