//! Backend actor clients.
//!
//! - [`HttpBackend`]: JSON RPC to a deployed actor gateway
//! - [`MemoryBackend`]: in-process actor for local development and tests

mod http;
mod memory;

use std::sync::Arc;

use clinic_core::Backend;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::config::Config;

/// Build the backend selected by configuration.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn Backend>> {
    match &config.backend_url {
        Some(url) => {
            tracing::info!(url = %url, "using HTTP backend");
            Ok(Arc::new(HttpBackend::new(url, config.backend_timeout)?))
        }
        None => {
            tracing::warn!(
                seed_admin = %config.seed_admin.user_id,
                "CLINIC_BACKEND_URL not set, using in-memory backend"
            );
            Ok(Arc::new(MemoryBackend::new(config.seed_admin.clone())))
        }
    }
}
