use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or duplicate signup input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced user or email does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token failed verification or resolves to a user that no longer exists.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing or unparseable Authorization header.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Signing secret or token lifetime is unusable. Raised at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transient persistence failure; safe for the caller to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::Validation(reason) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", reason.clone())
            }
            AuthError::NotFound(reason) => (StatusCode::NOT_FOUND, "NOT_FOUND", reason.clone()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AuthError::Unauthorized(reason) => {
                tracing::debug!(target: "auth.errors", reason = %reason, "Rejecting unauthorized request");
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "The access token is invalid or expired".to_string(),
                )
            }
            AuthError::MalformedRequest(reason) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_REQUEST", reason.clone())
            }
            AuthError::Configuration(reason) => {
                tracing::error!(target: "auth.errors", reason = %reason, "Configuration error surfaced at request time");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The service is misconfigured".to_string(),
                )
            }
            AuthError::StoreUnavailable(reason) => {
                tracing::warn!(target: "auth.errors", reason = %reason, "User store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The service is temporarily unavailable. Please retry.".to_string(),
                )
            }
            AuthError::Crypto(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
            AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
