use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AuthError;
use crate::observability::metrics::record_token_validation;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Maximum allowed JWT size in bytes (4KB).
///
/// Oversized tokens are rejected before any base64 decoding or HMAC work.
/// A normal token from this service is well under 300 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 4096;

/// Plaintext behind the hash verified for unknown accounts. Never matches a
/// real signin because the hash it produces is never stored.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// JWT Claims structure.
///
/// `sub` carries the user id and is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub iat: i64,    // Issued at timestamp
    pub exp: i64,    // Expiration timestamp
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Sign JWT with the HS256 shared secret
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Configuration(
            "JWT signing secret is empty".to_string(),
        ));
    }

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify JWT with the HS256 shared secret
///
/// Validates:
/// - Token size (must be <= MAX_JWT_SIZE_BYTES)
/// - Signature (HS256 only; other algorithms are refused)
/// - Expiration (`exp` claim, no leeway)
/// - Issued-at time (`iat` claim) no further in the future than `clock_skew_seconds`
///
/// Every failure maps to `AuthError::Unauthorized` with the same message; the
/// concrete reason is only logged at debug level.
#[instrument(skip_all)]
pub fn verify_jwt(token: &str, secret: &[u8], clock_skew_seconds: i64) -> Result<Claims, AuthError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "auth.crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        record_token_validation("error", Some("oversized"));
        return Err(AuthError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data =
        decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).map_err(|e| {
            tracing::debug!(target: "auth.crypto", error = %e, "Token verification failed");
            record_token_validation("error", Some("signature_or_expiry"));
            AuthError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
        })?;

    // Reject tokens minted in the future beyond the tolerated clock drift
    let now = chrono::Utc::now().timestamp();
    let max_iat = now + clock_skew_seconds;

    if token_data.claims.iat > max_iat {
        tracing::debug!(
            target: "auth.crypto",
            iat = token_data.claims.iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        record_token_validation("error", Some("clock_skew"));
        return Err(AuthError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()));
    }

    record_token_validation("success", None);
    Ok(token_data.claims)
}

/// Bcrypt hash verified when the account does not exist.
///
/// Must be produced at the same cost as stored hashes so the "unknown email"
/// path costs the same as the "wrong password" path.
pub fn dummy_password_hash(cost: u32) -> Result<String, AuthError> {
    hash_password(DUMMY_PASSWORD, cost)
}

/// Hash a password with bcrypt using a configurable cost factor.
///
/// # Errors
///
/// Returns `AuthError::Crypto` if the cost is outside 10-14 or hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    // Config validates the cost too; direct callers must not get a weaker hash.
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AuthError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {}", e)))
}
