//! Observability module for the auth service
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field
//! allow-listing. Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (outcomes, user ids)
//! - **HASHED**: Must be SHA-256 hashed for correlation (email)
//! - **NEVER**: Must never appear in logs (passwords, hashes, tokens, secrets)

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for fields like `email` that need correlation across log entries
/// but should not be stored in plaintext. This is not a secret-grade hash.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}
