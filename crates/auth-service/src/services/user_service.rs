//! User service module for signup, signin and account listing.
//!
//! Coordinates the credential store and the token authority. Both arrive as
//! trait objects through the constructor; `main` does the wiring.

use crate::crypto;
use crate::errors::AuthError;
use crate::models::{NewUser, SigninRequest, SigninResponse, SignupRequest, User};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{record_bcrypt_duration, record_signin, record_signup};
use crate::repositories::users::UserStore;
use crate::services::token_service::TokenAuthority;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Signup/signin orchestration.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenAuthority>,
    bcrypt_cost: u32,
    // Verified on unknown-email signins; same cost as real hashes.
    dummy_hash: Arc<str>,
}

impl UserService {
    /// Build the orchestrator.
    ///
    /// Hashes the unknown-account placeholder once at `bcrypt_cost`, so an
    /// out-of-range cost is rejected here with `Crypto`.
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenAuthority>,
        bcrypt_cost: u32,
    ) -> Result<Self, AuthError> {
        let dummy_hash = crypto::dummy_password_hash(bcrypt_cost)?;

        Ok(Self {
            users,
            tokens,
            bcrypt_cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Register a new account.
    ///
    /// # Steps
    ///
    /// 1. Trim and require name, email and password
    /// 2. Check the email shape
    /// 3. Hash the password (bcrypt, off the async runtime)
    /// 4. Persist through the store, which enforces email uniqueness
    #[instrument(skip_all)]
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        let result = self.signup_inner(request).await;
        match &result {
            Ok(user) => {
                tracing::info!(target: "auth.services.user", user_id = %user.id, "User signed up");
                record_signup("success", None);
            }
            Err(AuthError::Validation(_)) => record_signup("error", Some("validation")),
            Err(_) => record_signup("error", Some("internal")),
        }
        result
    }

    async fn signup_inner(&self, request: SignupRequest) -> Result<User, AuthError> {
        let name = request.name.trim();
        let email = request.email.trim();
        let password = request.password.expose_secret();

        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        if !is_valid_email(email) {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let password_hash = self.hash_password(password.to_string()).await?;

        self.users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
    }

    /// Authenticate by email and password and issue an access token.
    ///
    /// An unknown email yields `NotFound`, a wrong password
    /// `InvalidCredentials`. The HTTP layer folds both into the same response.
    /// A dummy bcrypt check runs for unknown emails so the two paths take
    /// comparable time.
    #[instrument(skip_all)]
    pub async fn signin(&self, request: SigninRequest) -> Result<SigninResponse, AuthError> {
        let start = Instant::now();
        let result = self.signin_inner(request).await;

        let reason = match &result {
            Ok(_) => None,
            Err(AuthError::NotFound(_)) => Some("unknown_email"),
            Err(AuthError::InvalidCredentials) => Some("invalid_credentials"),
            Err(_) => Some("internal"),
        };
        let status = if result.is_ok() { "success" } else { "error" };
        record_signin(status, reason, start.elapsed());

        result
    }

    async fn signin_inner(&self, request: SigninRequest) -> Result<SigninResponse, AuthError> {
        let email = request.email.trim();
        let password = request.password.expose_secret().to_string();

        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(AuthError::NotFound(msg)) => {
                // Burn the same bcrypt work as a real comparison; the result is irrelevant.
                let _ = self
                    .verify_password(password, self.dummy_hash.to_string())
                    .await;
                tracing::debug!(
                    target: "auth.services.user",
                    email_hash = %hash_for_correlation(email),
                    "Signin for unknown email"
                );
                return Err(AuthError::NotFound(msg));
            }
            Err(e) => return Err(e),
        };

        if !self
            .verify_password(password, user.password_hash.clone())
            .await?
        {
            tracing::debug!(target: "auth.services.user", user_id = %user.id, "Signin with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue_token(user.id)?;

        tracing::info!(target: "auth.services.user", user_id = %user.id, "User signed in");

        Ok(SigninResponse {
            name: user.name,
            email: user.email,
            jwt_token: issued.token,
        })
    }

    /// Every registered user.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        self.users.list_all().await
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        let start = Instant::now();
        let hash = tokio::task::spawn_blocking(move || crypto::hash_password(&password, cost))
            .await
            .map_err(|e| {
                tracing::error!(target: "auth.services.user", error = %e, "Password hashing task failed");
                AuthError::Internal
            })??;
        record_bcrypt_duration("hash", start.elapsed());
        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let start = Instant::now();
        let matches = tokio::task::spawn_blocking(move || crypto::verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(target: "auth.services.user", error = %e, "Password verification task failed");
                AuthError::Internal
            })??;
        record_bcrypt_duration("verify", start.elapsed());
        Ok(matches)
    }
}

/// Simple email validation.
///
/// Checks for basic email format: something@something.something
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(l), Some(d), None) => (l, d),
        _ => return false,
    };

    if local.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    // Domain must have at least one dot and no empty labels
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
