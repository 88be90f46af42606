use crate::errors::AuthError;
use crate::middleware::AuthenticatedUser;
use crate::models::UserResponse;
use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use super::auth_handler::AppState;

/// List every registered user
///
/// GET /api/v1/users (bearer token required)
pub async fn handle_list_users(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(caller)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    tracing::debug!(target: "auth.handlers.users", caller_id = %caller.id, "Listing users");

    let users = state.users.list_users().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Return the caller's own account
///
/// GET /api/v1/users/me (bearer token required)
pub async fn handle_me(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
