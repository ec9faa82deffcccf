pub mod in_memory;
pub mod redis;
pub mod restore;

use async_trait::async_trait;

pub use in_memory::InMemorySessionStore;
pub use redis::RedisSessionStore;
pub use restore::RestoredSession;
pub use restore::capture;
pub use restore::restore;

use crate::Result;
use crate::model::SessionDocument;
use crate::model::SessionSummary;

/// Last-write-wins document store keyed by session id. Documents are always
/// written and read whole.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(
        &self,
        document: &SessionDocument,
    ) -> Result<()>;

    async fn load(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionDocument>>;

    /// Sessions owned by `user_id`, newest first.
    async fn list(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionSummary>>;
}
