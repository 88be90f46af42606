//! Metrics definitions for the auth service
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! Label values are bounded by code (`status`, `reason`, `operation`).

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder.
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))
}

/// Record a signup outcome
///
/// Metric: `auth_signup_total`
/// Labels: `status` (success, error), `reason`
pub fn record_signup(status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("auth_signup_total", "status" => status.to_string(), "reason" => reason.to_string())
        .increment(1);
}

/// Record a signin outcome and its duration
///
/// Metric: `auth_signin_total`, `auth_signin_duration_seconds`
/// Labels: `status` (success, error), `reason`
pub fn record_signin(status: &str, reason: Option<&str>, duration: Duration) {
    let reason = reason.unwrap_or("none");
    histogram!("auth_signin_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());
    counter!("auth_signin_total", "status" => status.to_string(), "reason" => reason.to_string())
        .increment(1);
}

/// Record token issuance
///
/// Metric: `auth_token_issuance_total`
/// Labels: `status`
pub fn record_token_issuance(status: &str) {
    counter!("auth_token_issuance_total", "status" => status.to_string()).increment(1);
}

/// Record token validation result
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record bcrypt operation duration
///
/// Metric: `auth_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &str, duration: Duration) {
    histogram!("auth_bcrypt_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());
}
