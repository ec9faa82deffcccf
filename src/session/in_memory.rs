use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::SessionStore;
use crate::Result;
use crate::model::SessionDocument;
use crate::model::SessionSummary;

/// Process-local store, used when no Redis is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    documents: Arc<RwLock<HashMap<String, SessionDocument>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(
        &self,
        document: &SessionDocument,
    ) -> Result<()> {
        self.documents.write().await.insert(document.id.clone(), document.clone());
        debug!("memory_session_saved::{}", document.id);
        Ok(())
    }

    async fn load(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionDocument>> {
        Ok(self.documents.read().await.get(session_id).cloned())
    }

    async fn list(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>> {
        let documents = self.documents.read().await;
        let mut sessions: Vec<SessionSummary> =
            documents.values().filter(|doc| doc.user_id == user_id).map(SessionDocument::summary).collect();
        sessions.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::TestFixtures;

    #[tokio::test]
    async fn save_overwrites_and_load_returns_latest() {
        let store = InMemorySessionStore::new();
        let mut doc = SessionDocument::empty(&TestFixtures::session_meta("s1", "alice", 0));
        store.save(&doc).await.unwrap();
        doc.name = "renamed".to_string();
        store.save(&doc).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.load("s1").await.unwrap().unwrap().name, "renamed");
        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_per_user_and_newest_first() {
        let store = InMemorySessionStore::new();
        for (id, user, secs) in [("old", "alice", 10), ("new", "alice", 20), ("other", "bob", 30)] {
            store.save(&SessionDocument::empty(&TestFixtures::session_meta(id, user, secs))).await.unwrap();
        }

        let ids: Vec<_> = store.list("alice").await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert!(store.list("carol").await.unwrap().is_empty());
    }
}
