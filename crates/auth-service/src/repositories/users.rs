//! User repository module.
//!
//! Owns user records behind the [`UserStore`] trait. Two implementations:
//! [`PgUserStore`] backed by PostgreSQL, and [`memory::InMemoryUserStore`]
//! for tests and local runs without a database.
//!
//! Email uniqueness is enforced atomically by the storage layer (unique index
//! or write lock), never by a check-then-insert in the service layer.

use crate::errors::AuthError;
use crate::models::{NewUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the unique index on `users.email` (see migrations).
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_unique";

/// Credential store operations.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with `Validation` on empty fields or a duplicate email.
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Fails with `NotFound` when no user has this id.
    async fn find_by_id(&self, id: Uuid) -> Result<User, AuthError>;

    /// Fails with `NotFound` when no user has this email.
    async fn find_by_email(&self, email: &str) -> Result<User, AuthError>;

    /// Every user, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, AuthError>;
}

fn validate_new_user(new_user: &NewUser) -> Result<(), AuthError> {
    if new_user.name.trim().is_empty() {
        return Err(AuthError::Validation("Name is required".to_string()));
    }
    if new_user.email.trim().is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }
    if new_user.password_hash.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(())
}

fn duplicate_email() -> AuthError {
    AuthError::Validation("An account with this email already exists".to_string())
}

/// Map a sqlx error onto the service taxonomy.
///
/// Connection-level failures become `StoreUnavailable` so callers can retry.
fn map_sqlx_error(context: &str, e: sqlx::Error) -> AuthError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.is_unique_violation()
                || db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
        {
            duplicate_email()
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AuthError::StoreUnavailable(format!("{}: {}", context, e))
        }
        other => {
            tracing::error!(target: "auth.repositories.users", error = %other, "{}", context);
            AuthError::Internal
        }
    }
}

/// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        validate_new_user(&new_user)?;

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create user", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to fetch user by id", e))?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to fetch user by email", e))?
        .ok_or_else(|| AuthError::NotFound("Email not found".to_string()))
    }

    async fn list_all(&self) -> Result<Vec<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list users", e))
    }
}

/// In-memory user store.
pub mod memory {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct Inner {
        by_id: HashMap<Uuid, User>,
        // email -> id
        by_email: HashMap<String, Uuid>,
        // ids in insertion order
        order: Vec<Uuid>,
    }

    /// `UserStore` kept in process memory.
    ///
    /// The write lock makes the duplicate check and the insert one atomic step.
    #[derive(Default)]
    pub struct InMemoryUserStore {
        inner: RwLock<Inner>,
    }

    impl InMemoryUserStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored users.
        pub async fn len(&self) -> usize {
            self.inner.read().await.order.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.len().await == 0
        }
    }

    #[async_trait::async_trait]
    impl UserStore for InMemoryUserStore {
        async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
            validate_new_user(&new_user)?;

            let mut inner = self.inner.write().await;
            if inner.by_email.contains_key(&new_user.email) {
                return Err(duplicate_email());
            }

            let user = User {
                id: Uuid::new_v4(),
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                created_at: Utc::now(),
            };

            inner.by_email.insert(user.email.clone(), user.id);
            inner.order.push(user.id);
            inner.by_id.insert(user.id, user.clone());

            Ok(user)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<User, AuthError> {
            self.inner
                .read()
                .await
                .by_id
                .get(&id)
                .cloned()
                .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
        }

        async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
            let inner = self.inner.read().await;
            inner
                .by_email
                .get(email)
                .and_then(|id| inner.by_id.get(id))
                .cloned()
                .ok_or_else(|| AuthError::NotFound("Email not found".to_string()))
        }

        async fn list_all(&self) -> Result<Vec<User>, AuthError> {
            let inner = self.inner.read().await;
            Ok(inner
                .order
                .iter()
                .filter_map(|id| inner.by_id.get(id).cloned())
                .collect())
        }
    }
}
