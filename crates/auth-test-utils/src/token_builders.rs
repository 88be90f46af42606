//! Builder patterns for test data construction
//!
//! Provides a fluent API for minting tokens the way the server would,
//! including deliberately broken ones.

use crate::fixtures::TEST_JWT_SECRET;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

/// Builder for creating test JWTs
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user(user.id)
///     .expires_in(-60)
///     .sign();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    exp: i64,
    iat: i64,
    secret: Vec<u8>,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    ///
    /// Defaults match a freshly issued server token: one hour lifetime,
    /// HS256 over the test secret.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Uuid::nil().to_string(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
            secret: TEST_JWT_SECRET.as_bytes().to_vec(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Set the subject to a user id
    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.sub = user_id.to_string();
        self
    }

    /// Set a raw subject string (for non-UUID subjects)
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Sign with a different secret
    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.as_bytes().to_vec();
        self
    }

    /// Sign with a different HMAC algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the claims as a JSON value
    pub fn build(&self) -> serde_json::Value {
        json!({
            "sub": self.sub,
            "exp": self.exp,
            "iat": self.iat,
        })
    }

    /// Sign the claims into a compact JWT
    pub fn sign(self) -> String {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());

        encode(
            &header,
            &self.build(),
            &EncodingKey::from_secret(&self.secret),
        )
        .expect("HMAC signing of test claims cannot fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
