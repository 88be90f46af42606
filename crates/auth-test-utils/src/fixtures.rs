//! Fixed test data for deterministic tests
//!
//! Using fixed secrets and user data keeps test results reproducible.

use auth_service::config::{
    Config, DEFAULT_JWT_CLOCK_SKEW_SECONDS, DEFAULT_JWT_EXPIRATION_SECONDS, MIN_BCRYPT_COST,
};
use secrecy::SecretString;

/// HS256 signing secret used by every test server (32 bytes).
pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-prod!!";

/// A different secret of valid length, for wrong-key tests.
pub const OTHER_JWT_SECRET: &str = "another-secret-not-the-server-s!";

// Signup data
pub const ANN_NAME: &str = "Ann";
pub const ANN_EMAIL: &str = "ann@x.com";
pub const ANN_PASSWORD: &str = "secret";

pub const BOB_NAME: &str = "Bob";
pub const BOB_EMAIL: &str = "bob@x.com";
pub const BOB_PASSWORD: &str = "hunter22";

/// Configuration for in-process test servers.
///
/// Uses the cheapest accepted bcrypt cost so tests stay fast.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(), // Not used by the in-memory store
        bind_address: "127.0.0.1:0".to_string(),
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        jwt_expiration_seconds: DEFAULT_JWT_EXPIRATION_SECONDS,
        jwt_clock_skew_seconds: DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        bcrypt_cost: MIN_BCRYPT_COST,
        request_timeout_seconds: 30,
        db_max_connections: 1,
    }
}
