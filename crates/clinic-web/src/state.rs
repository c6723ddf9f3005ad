//! Application state shared across all request handlers.

use std::sync::Arc;

use clinic_core::Backend;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::session::SessionStore;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Client for the backend actor.
    pub backend: Arc<dyn Backend>,

    /// Application configuration.
    pub config: Arc<Config>,

    /// Signed-in portal users keyed by session id.
    pub sessions: SessionStore,

    /// Per-session cache of backend query results.
    pub queries: QueryCache,
}

impl AppState {
    /// Create a new application state from configuration and a backend client.
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        let queries = QueryCache::default();

        tracing::info!(
            session_ttl_secs = config.session_ttl.as_secs(),
            query_cache_capacity = crate::cache::DEFAULT_CACHE_CAPACITY,
            query_cache_ttl_secs = crate::cache::DEFAULT_TTL.as_secs(),
            "application state initialized"
        );

        Self {
            backend,
            config: Arc::new(config),
            sessions,
            queries,
        }
    }
}
