use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Owner of the sessions this process creates and may load
    pub user_id: String,
    /// Skip transactions whose hash is already in the graph
    pub dedup_by_hash: bool,
    pub request_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            dedup_by_hash: false,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}
