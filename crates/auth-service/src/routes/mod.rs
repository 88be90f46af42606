//! HTTP routes for the auth service.

use crate::handlers::{self, auth_handler, auth_handler::AppState, user_handler};
use crate::middleware::{require_user, AuthState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Build the application routes.
///
/// - `/health` - Liveness probe - public
/// - `/metrics` - Prometheus metrics - public
/// - `/api/v1/auth/signup`, `/api/v1/auth/signin` - public
/// - `/api/v1/users`, `/api/v1/users/me` - bearer token required
/// - TraceLayer for request logging
/// - Request timeout of `request_timeout`
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let auth_state = Arc::new(AuthState {
        tokens: Arc::clone(&state.tokens),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/auth/signup", post(auth_handler::handle_signup))
        .route("/api/v1/auth/signin", post(auth_handler::handle_signin))
        .with_state(Arc::clone(&state));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/v1/users", get(user_handler::handle_list_users))
        .route("/api/v1/users/me", get(user_handler::handle_me))
        .route_layer(middleware::from_fn_with_state(auth_state, require_user))
        .with_state(state);

    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
}
