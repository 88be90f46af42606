use crate::errors::AuthError;
use crate::models::{SigninRequest, SigninResponse, SignupRequest, UserResponse};
use crate::services::token_service::TokenAuthority;
use crate::services::user_service::UserService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub tokens: Arc<dyn TokenAuthority>,
}

/// Map an unreadable or incomplete JSON body to `Validation`.
fn body_or_validation<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(target: "auth.handlers.auth", error = %rejection, "Rejected request body");
        AuthError::Validation(rejection.body_text())
    })
}

/// Handle account signup
///
/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let user = state.users.signup(body_or_validation(payload)?).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Handle signin
///
/// POST /api/v1/auth/signin
///
/// Unknown email and wrong password produce the same 401 response so the
/// endpoint cannot be used to discover registered addresses.
pub async fn handle_signin(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<SigninResponse>, AuthError> {
    let request = body_or_validation(payload)?;
    let response = state.users.signin(request).await.map_err(|e| match e {
        AuthError::NotFound(_) => AuthError::InvalidCredentials,
        other => other,
    })?;

    Ok(Json(response))
}
