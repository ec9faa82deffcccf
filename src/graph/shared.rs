use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::RwLockReadGuard;
use tokio::sync::RwLockWriteGuard;

use super::GraphStore;
use super::MergeOptions;
use super::MergeReport;
use crate::model::CryptoType;
use crate::model::GraphSnapshot;
use crate::model::Node;
use crate::model::Transaction;

// Thread-safe wrapper for the graph
#[derive(Debug, Clone)]
pub struct SharedGraphStore {
    inner: Arc<RwLock<GraphStore>>,
}

impl SharedGraphStore {
    pub fn new(options: MergeOptions) -> Self {
        Self::from(GraphStore::new(options))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, GraphStore> {
        self.inner.read().await
    }

    /// Held across a whole command so a batch and its save are one step.
    pub async fn write(&self) -> RwLockWriteGuard<'_, GraphStore> {
        self.inner.write().await
    }

    pub async fn merge_transactions(
        &self,
        transactions: &[Transaction],
        crypto_type: CryptoType,
    ) -> MergeReport {
        self.inner.write().await.merge_transactions(transactions, crypto_type)
    }

    pub async fn snapshot(&self) -> GraphSnapshot {
        self.inner.read().await.snapshot()
    }

    pub async fn node(
        &self,
        id: &str,
    ) -> Option<Node> {
        self.inner.read().await.node(id).cloned()
    }

    pub async fn node_count(&self) -> usize {
        self.inner.read().await.node_count()
    }

    pub async fn edge_count(&self) -> usize {
        self.inner.read().await.edge_count()
    }
}

impl Default for SharedGraphStore {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

impl From<GraphStore> for SharedGraphStore {
    fn from(graph: GraphStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::TestFixtures;

    #[tokio::test]
    async fn concurrent_batches_on_a_shared_node_lose_nothing() {
        let shared = SharedGraphStore::default();

        let mut handles = Vec::new();
        for i in 0..8 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                let peer = format!("P{}", i);
                let batch = vec![
                    TestFixtures::eth_tx("HUB", &peer, "1"),
                    TestFixtures::eth_tx(&peer, "HUB", "1"),
                ];
                shared.merge_transactions(&batch, CryptoType::Eth).await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(shared.node("HUB").await.unwrap().transactions.len(), 16);
        assert_eq!(shared.node_count().await, 9);
        assert_eq!(shared.edge_count().await, 16);
    }
}
