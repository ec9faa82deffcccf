//! Provider payloads to canonical [`Transaction`](crate::model::Transaction)s.

pub mod btc;
pub mod domain;
pub mod eth;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::err_with_loc;
use crate::error::TraceError;

// Typed view of a raw payload, any shape mismatch is the provider's fault
fn parse_payload<T: DeserializeOwned>(
    raw: &Value,
    provider: &str,
) -> Result<T> {
    T::deserialize(raw).map_err(|e| err_with_loc!(TraceError::upstream(provider, format!("malformed payload: {}", e))))
}
