//! Data transfer objects for web requests and responses.

use serde::Serialize;
use serde_json::Value;

use crate::resolver::Lookup;

/// Response to a lookup request.
///
/// Serializes as `{"results": {...}, "errors": {...}}`.
pub type LookupResponse = Lookup;

/// Pull the postcode list out of a request body.
///
/// Returns `None` unless the body is a JSON array of strings.
pub fn postcode_list(body: Value) -> Option<Vec<String>> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Health probe response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,

    /// Shard currently in memory, if any
    pub resident_shard: Option<u8>,

    /// Shard loads since startup
    pub shard_loads: u64,
}
