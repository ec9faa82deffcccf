use std::sync::Arc;

use async_trait::async_trait;
use bb8::Pool;
use bb8::PooledConnection;
use bb8_redis::RedisConnectionManager;
use bb8_redis::redis;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::SessionStore;
use crate::Result;
use crate::config::StorageRedisConfig;
use crate::err_with_loc;
use crate::error::RedisClientError;
use crate::model::SessionDocument;
use crate::model::SessionSummary;

pub type RedisPool = Arc<Pool<RedisConnectionManager>>;

/// Session documents as JSON strings, plus one sorted set per user scored by
/// creation time for listing.
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
  pub pool:   RedisPool,
  key_prefix: String,
}

pub async fn make_redis_session_store(
  engine_name: &str,
  config: &StorageRedisConfig,
) -> Result<RedisSessionStore> {
  let redis_url = config.url();
  let manager = RedisConnectionManager::new(redis_url.as_str()).map_err(|e| {
    error!("failed_to_create_redis_manager: {}", e);
    err_with_loc!(RedisClientError::CreateConnectionManagerError(e))
  })?;
  let pool = Pool::builder().max_size(config.pool_size).build(manager).await.map_err(|e| {
    error!("failed_to_build_redis_pool: {}", e);
    err_with_loc!(RedisClientError::RedisError(e))
  })?;
  info!("{}::redis::connection_established::{}", engine_name, redis_url);
  Ok(RedisSessionStore::new(Arc::new(pool), &config.key_prefix))
}

impl RedisSessionStore {
  pub fn new(
    pool: RedisPool,
    key_prefix: &str,
  ) -> Self {
    Self { pool, key_prefix: key_prefix.to_string() }
  }

  pub fn session_key(
    &self,
    session_id: &str,
  ) -> String {
    format!("{}:session:{}", self.key_prefix, session_id)
  }

  pub fn user_index_key(
    &self,
    user_id: &str,
  ) -> String {
    format!("{}:user:{}:sessions", self.key_prefix, user_id)
  }

  pub async fn get_connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
    self.pool.get().await.map_err(|e| {
      error!("failed_to_get_redis_connection: {}", e);
      err_with_loc!(RedisClientError::GetConnectionError(e))
    })
  }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
  async fn save(
    &self,
    document: &SessionDocument,
  ) -> Result<()> {
    let mut conn = self.get_connection().await?;
    let json = serde_json::to_string(document).map_err(|e| {
      error!("serialize_session_failed: {}", e);
      err_with_loc!(RedisClientError::SerializeError(e))
    })?;

    let _: () = redis::pipe()
      .atomic()
      .cmd("SET")
      .arg(self.session_key(&document.id))
      .arg(json)
      .ignore()
      .cmd("ZADD")
      .arg(self.user_index_key(&document.user_id))
      .arg(document.created.timestamp_millis())
      .arg(&document.id)
      .ignore()
      .query_async(&mut *conn)
      .await
      .map_err(|e| {
        error!("redis_save_session_failed: {}", e);
        err_with_loc!(RedisClientError::RedisError(e))
      })?;

    debug!("redis_save_session_done::{}", document.id);
    Ok(())
  }

  async fn load(
    &self,
    session_id: &str,
  ) -> Result<Option<SessionDocument>> {
    let mut conn = self.get_connection().await?;

    let json: Option<String> =
      redis::cmd("GET").arg(self.session_key(session_id)).query_async(&mut *conn).await.map_err(|e| {
        error!("redis_load_session_failed: {}", e);
        err_with_loc!(RedisClientError::RedisError(e))
      })?;

    match json {
      Some(json) => {
        let document = serde_json::from_str(&json).map_err(|e| {
          error!("deserialize_session_failed: {}", e);
          err_with_loc!(RedisClientError::DeserializeError(e))
        })?;
        Ok(Some(document))
      },
      None => Ok(None),
    }
  }

  async fn list(
    &self,
    user_id: &str,
  ) -> Result<Vec<SessionSummary>> {
    let mut conn = self.get_connection().await?;

    let ids: Vec<String> = redis::cmd("ZREVRANGE")
      .arg(self.user_index_key(user_id))
      .arg(0)
      .arg(-1)
      .query_async(&mut *conn)
      .await
      .map_err(|e| {
        error!("redis_list_sessions_failed: {}", e);
        err_with_loc!(RedisClientError::RedisError(e))
      })?;
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let keys: Vec<String> = ids.iter().map(|id| self.session_key(id)).collect();
    let documents: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut *conn).await.map_err(|e| {
      error!("redis_mget_sessions_failed: {}", e);
      err_with_loc!(RedisClientError::RedisError(e))
    })?;

    let mut sessions = Vec::with_capacity(documents.len());
    for (id, json) in ids.iter().zip(documents) {
      let Some(json) = json else {
        warn!("redis_session_index_stale::{}::{}", user_id, id);
        continue;
      };
      let document: SessionDocument = serde_json::from_str(&json).map_err(|e| {
        error!("deserialize_session_failed: {}", e);
        err_with_loc!(RedisClientError::DeserializeError(e))
      })?;
      sessions.push(document.summary());
    }
    Ok(sessions)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn keys_are_namespaced_by_prefix() {
    let manager = RedisConnectionManager::new("redis://127.0.0.1:6379").unwrap();
    let pool = Pool::builder().max_size(1).build_unchecked(manager);
    let store = RedisSessionStore::new(Arc::new(pool), "ft");

    assert_eq!(store.session_key("abc"), "ft:session:abc");
    assert_eq!(store.user_index_key("alice"), "ft:user:alice:sessions");
  }
}
