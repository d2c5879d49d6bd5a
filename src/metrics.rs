//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Auth flow metrics
    pub static ref AUTH_LOGINS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatehouse_auth_logins_total", "Total number of login redirects issued"),
        &["provider"]
    ).expect("metric can be created");
    pub static ref AUTH_CALLBACKS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatehouse_auth_callbacks_total", "Total number of OAuth callbacks handled"),
        &["provider", "outcome"]
    ).expect("metric can be created");
    pub static ref AUTH_LOGOUTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatehouse_auth_logouts_total", "Total number of logouts"),
        &["provider"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatehouse_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(AUTH_LOGINS_TOTAL.clone()))
        .expect("AUTH_LOGINS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(AUTH_CALLBACKS_TOTAL.clone()))
        .expect("AUTH_CALLBACKS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(AUTH_LOGOUTS_TOTAL.clone()))
        .expect("AUTH_LOGOUTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}

/// Metrics endpoint handler
///
/// Returns all metrics in Prometheus text format.
async fn metrics_handler() -> axum::response::Response {
    use axum::response::IntoResponse;
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_text) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, encoder.format_type())],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

/// Create metrics router
///
/// Exposes the `/metrics` endpoint.
pub fn metrics_router<S>() -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    axum::Router::new().route("/metrics", axum::routing::get(metrics_handler))
}
