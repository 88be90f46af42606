//! Bearer-token authentication middleware.
//!
//! Extracts the token from the Authorization header, verifies signature and
//! expiry, resolves the bound user, and injects it into request extensions.

use crate::errors::AuthError;
use crate::models::User;
use crate::services::token_service::{extract_token_from_header, TokenAuthority};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenAuthority>,
}

/// The user a verified token resolved to.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Authentication middleware for user tokens.
///
/// # Response
///
/// - 400 if the Authorization header is missing or malformed
/// - 401 if the token is invalid, expired, or bound to an unknown user
/// - Otherwise continues with `AuthenticatedUser` in extensions
#[instrument(skip_all, name = "auth.middleware.require_user")]
pub async fn require_user(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let user_id = {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|h| h.to_str())
            .transpose()
            .map_err(|_| {
                AuthError::MalformedRequest("Authorization header is not valid ASCII".to_string())
            })?;

        let token = extract_token_from_header(header).map_err(|e| {
            tracing::debug!(target: "auth.middleware.auth", error = %e, "Rejected Authorization header");
            e
        })?;

        state.tokens.verify_token(token)?
    };

    let user = state.tokens.resolve_user(user_id).await?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}
