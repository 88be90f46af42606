use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default JWT lifetime in seconds (1 hour).
pub const DEFAULT_JWT_EXPIRATION_SECONDS: i64 = 3600;

/// Longest accepted JWT lifetime in seconds (365 days).
pub const MAX_JWT_EXPIRATION_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Minimum accepted length of the HS256 signing secret, in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Bcrypt cost bounds. Below 10 is too weak, above 14 is too slow for a login path.
pub const MIN_BCRYPT_COST: u32 = 10;
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default tolerance for `iat` claims issued slightly in the future.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// Default request-level timeout applied by the HTTP stack.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default size of the PostgreSQL connection pool.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Process configuration, loaded once at startup.
///
/// The signing secret is wrapped in `SecretString` so it never shows up in
/// `Debug` output or logs.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_seconds: i64,
    pub jwt_clock_skew_seconds: i64,
    pub bcrypt_cost: u32,
    pub request_timeout_seconds: u64,
    pub db_max_connections: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_seconds", &self.jwt_expiration_seconds)
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT expiration: {0}")]
    InvalidJwtExpiration(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let jwt_expiration_seconds = match vars.get("JWT_EXPIRATION") {
            Some(raw) => parse_duration_seconds(raw)?,
            None => DEFAULT_JWT_EXPIRATION_SECONDS,
        };

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidBcryptCost(format!("'{}' is not a number", raw))
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidBcryptCost(format!(
                        "{} is outside {}-{}",
                        cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                    )));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let jwt_clock_skew_seconds = match vars.get("JWT_CLOCK_SKEW_SECONDS") {
            Some(raw) => {
                let skew: i64 = parse_number("JWT_CLOCK_SKEW_SECONDS", raw)?;
                if !(0..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&skew) {
                    return Err(ConfigError::InvalidValue {
                        name: "JWT_CLOCK_SKEW_SECONDS".to_string(),
                        reason: format!("must be 0-{}", MAX_JWT_CLOCK_SKEW_SECONDS),
                    });
                }
                skew
            }
            None => DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        };

        let request_timeout_seconds = match vars.get("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => {
                let secs: u64 = parse_number("REQUEST_TIMEOUT_SECONDS", raw)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "REQUEST_TIMEOUT_SECONDS".to_string(),
                        reason: "must be greater than zero".to_string(),
                    });
                }
                secs
            }
            None => DEFAULT_REQUEST_TIMEOUT_SECONDS,
        };

        let db_max_connections = match vars.get("DB_MAX_CONNECTIONS") {
            Some(raw) => parse_number("DB_MAX_CONNECTIONS", raw)?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret: SecretString::from(jwt_secret.clone()),
            jwt_expiration_seconds,
            jwt_clock_skew_seconds,
            bcrypt_cost,
            request_timeout_seconds,
            db_max_connections,
        })
    }

    /// Raw bytes of the signing secret.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("'{}' is not a valid number", raw),
    })
}

/// Parse a token lifetime such as `3600`, `90s`, `15m`, `1h` or `7d` into seconds.
///
/// A bare number is read as seconds. The result must be strictly positive and
/// no longer than `MAX_JWT_EXPIRATION_SECONDS`.
pub fn parse_duration_seconds(raw: &str) -> Result<i64, ConfigError> {
    let value = raw.trim();
    let invalid = || ConfigError::InvalidJwtExpiration(format!("'{}' is not a valid duration", raw));

    let (digits, multiplier) = match value.chars().last() {
        Some('s') => (value.strip_suffix('s').unwrap_or(value), 1),
        Some('m') => (value.strip_suffix('m').unwrap_or(value), 60),
        Some('h') => (value.strip_suffix('h').unwrap_or(value), 60 * 60),
        Some('d') => (value.strip_suffix('d').unwrap_or(value), 24 * 60 * 60),
        Some(c) if c.is_ascii_digit() => (value, 1),
        _ => return Err(invalid()),
    };

    let amount: i64 = digits.trim().parse().map_err(|_| invalid())?;
    let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;

    if seconds <= 0 {
        return Err(ConfigError::InvalidJwtExpiration(format!(
            "'{}' must be greater than zero",
            raw
        )));
    }

    if seconds > MAX_JWT_EXPIRATION_SECONDS {
        return Err(ConfigError::InvalidJwtExpiration(format!(
            "'{}' exceeds the maximum of {} seconds",
            raw, MAX_JWT_EXPIRATION_SECONDS
        )));
    }

    Ok(seconds)
}
