use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_REDIS_KEY_PREFIX;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageRedisConfig {
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub key_prefix: String,
}

impl Default for StorageRedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            pool_size: 8,
            key_prefix: DEFAULT_REDIS_KEY_PREFIX.to_string(),
        }
    }
}

impl StorageRedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}
