//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    backend: &'static str,
}

/// Public health check endpoint.
///
/// Reports process health only; the backend actor is not called.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "clinic-web",
        version: env!("CARGO_PKG_VERSION"),
        backend: if state.config.backend_url.is_some() {
            "http"
        } else {
            "memory"
        },
    })
}
