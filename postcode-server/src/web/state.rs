//! Application state for the web layer.

use std::sync::Arc;

use crate::store::ShardStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Postcode shards, shared by every request
    pub store: Arc<ShardStore>,

    /// Token clients must present
    pub auth_token: Arc<str>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: ShardStore, auth_token: impl Into<Arc<str>>) -> Self {
        Self {
            store: Arc::new(store),
            auth_token: auth_token.into(),
        }
    }
}
