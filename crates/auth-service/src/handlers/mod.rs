pub mod auth_handler;
pub mod user_handler;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Liveness probe
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// Prometheus scrape endpoint
///
/// GET /metrics
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}
