//! Prometheus metrics for the clinic portal.
//!
//! # Usage
//!
//! ```rust,ignore
//! use clinic_core::metrics::{start_metrics_server, try_init_metrics};
//!
//! if let Some(handle) = try_init_metrics() {
//!     start_metrics_server(9091, handle).await?;
//! }
//! clinic_core::metrics::record_booking("accepted");
//! ```
//!
//! # Metric Naming Conventions
//!
//! - Prefix: `portal_` for user-facing actions, `backend_` for actor calls
//! - Suffix: `_total` for counters, `_seconds` for durations
//! - Labels are small fixed sets (outcome, portal, action, method)

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, routing::get};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe the portal's metrics.
///
/// Returns `None` if a recorder is already installed.
pub fn try_init_metrics() -> Option<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder().ok()?;
    register_portal_metrics();
    Some(handle)
}

/// Serve `/metrics` on `port` from a background task.
///
/// Binding happens before this returns, so a taken port is reported to the
/// caller.
pub async fn start_metrics_server(port: u16, handle: PrometheusHandle) -> std::io::Result<()> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on http://{}/metrics", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "metrics server stopped");
        }
    });

    Ok(())
}

fn register_portal_metrics() {
    describe_counter!(
        "portal_bookings_total",
        "Appointment booking submissions (label: outcome)"
    );
    describe_counter!(
        "portal_logins_total",
        "Sign-in attempts (labels: portal, outcome)"
    );
    describe_counter!(
        "portal_status_updates_total",
        "Appointment status changes (label: outcome)"
    );
    describe_counter!(
        "portal_staff_changes_total",
        "Staff account changes made by administrators (label: action)"
    );
    describe_histogram!(
        "backend_call_seconds",
        "Latency of backend actor calls (label: method)"
    );
}

pub fn record_booking(outcome: &'static str) {
    metrics::counter!("portal_bookings_total", "outcome" => outcome).increment(1);
}

pub fn record_login(portal: &'static str, outcome: &'static str) {
    metrics::counter!("portal_logins_total", "portal" => portal, "outcome" => outcome)
        .increment(1);
}

/// `outcome` is `committed`, `rolled_back`, or `invalid`.
pub fn record_status_update(outcome: &'static str) {
    metrics::counter!("portal_status_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_staff_change(action: &'static str) {
    metrics::counter!("portal_staff_changes_total", "action" => action).increment(1);
}

pub fn record_backend_call(method: &'static str, elapsed: Duration) {
    metrics::histogram!("backend_call_seconds", "method" => method).record(elapsed.as_secs_f64());
}
