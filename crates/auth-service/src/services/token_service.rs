//! Token authority: issues HS256 access tokens bound to a user id, verifies
//! them, and resolves a verified id back to a stored user.

use crate::config::{Config, MAX_JWT_EXPIRATION_SECONDS, MIN_JWT_SECRET_BYTES};
use crate::crypto::{self, Claims};
use crate::errors::AuthError;
use crate::models::User;
use crate::observability::metrics::record_token_issuance;
use crate::repositories::users::UserStore;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// A freshly signed access token.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Token issuance, verification, and identity resolution.
#[async_trait::async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Sign a token for `user_id`. No I/O; the id is trusted.
    fn issue_token(&self, user_id: Uuid) -> Result<IssuedToken, AuthError>;

    /// Check signature and expiry and return the bound user id.
    fn verify_token(&self, token: &str) -> Result<Uuid, AuthError>;

    /// Look up the user behind a verified id. `Unauthorized` if it no longer exists.
    async fn resolve_user(&self, user_id: Uuid) -> Result<User, AuthError>;
}

/// `TokenAuthority` backed by a shared HS256 secret.
pub struct JwtTokenService {
    secret: SecretString,
    expiration_seconds: i64,
    clock_skew_seconds: i64,
    users: Arc<dyn UserStore>,
}

impl JwtTokenService {
    /// Build the authority from startup configuration.
    ///
    /// Rejects an unusable secret or lifetime here so that issuance never
    /// fails per request because of configuration.
    pub fn new(config: &Config, users: Arc<dyn UserStore>) -> Result<Self, AuthError> {
        Self::with_settings(
            config.jwt_secret.clone(),
            config.jwt_expiration_seconds,
            config.jwt_clock_skew_seconds,
            users,
        )
    }

    pub fn with_settings(
        secret: SecretString,
        expiration_seconds: i64,
        clock_skew_seconds: i64,
        users: Arc<dyn UserStore>,
    ) -> Result<Self, AuthError> {
        if secret.expose_secret().len() < MIN_JWT_SECRET_BYTES {
            return Err(AuthError::Configuration(format!(
                "JWT secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }
        if expiration_seconds <= 0 {
            return Err(AuthError::Configuration(
                "JWT expiration must be greater than zero".to_string(),
            ));
        }
        if expiration_seconds > MAX_JWT_EXPIRATION_SECONDS {
            return Err(AuthError::Configuration(format!(
                "JWT expiration must not exceed {} seconds",
                MAX_JWT_EXPIRATION_SECONDS
            )));
        }
        if clock_skew_seconds < 0 {
            return Err(AuthError::Configuration(
                "JWT clock skew must not be negative".to_string(),
            ));
        }

        Ok(Self {
            secret,
            expiration_seconds,
            clock_skew_seconds,
            users,
        })
    }
}

#[async_trait::async_trait]
impl TokenAuthority for JwtTokenService {
    #[instrument(skip_all, fields(user_id = %user_id))]
    fn issue_token(&self, user_id: Uuid) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let exp = now.checked_add(self.expiration_seconds).ok_or_else(|| {
            record_token_issuance("error");
            AuthError::Configuration("JWT expiration overflows the token timestamp".to_string())
        })?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp,
        };

        let token = crypto::sign_jwt(&claims, self.secret.expose_secret().as_bytes()).map_err(|e| {
            record_token_issuance("error");
            e
        })?;

        record_token_issuance("success");
        tracing::debug!(target: "auth.services.token", expires_in = self.expiration_seconds, "Issued access token");

        Ok(IssuedToken {
            token,
            expires_in: self.expiration_seconds,
        })
    }

    #[instrument(skip_all)]
    fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = crypto::verify_jwt(
            token,
            self.secret.expose_secret().as_bytes(),
            self.clock_skew_seconds,
        )?;

        Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::debug!(target: "auth.services.token", "Token subject is not a valid user id");
            AuthError::Unauthorized("The access token is invalid or expired".to_string())
        })
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn resolve_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        match self.users.find_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(AuthError::NotFound(_)) => {
                tracing::debug!(target: "auth.services.token", "Token bound to unknown user");
                Err(AuthError::Unauthorized("User not found".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Extract the bearer credential from a raw `Authorization` header value.
///
/// Expects `Bearer <token>`: the scheme (case-insensitive) and exactly one
/// credential, separated by whitespace.
pub fn extract_token_from_header(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or_else(|| {
        AuthError::MalformedRequest("Missing Authorization header".to_string())
    })?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedRequest(
            "Invalid Authorization header format".to_string(),
        )),
    }
}
