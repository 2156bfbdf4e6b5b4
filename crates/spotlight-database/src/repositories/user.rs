//! User repository: identity lookups and credential checks.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use spotlight_auth::PasswordHasher;
use spotlight_core::error::{AppError, ErrorKind};
use spotlight_core::result::AppResult;
use spotlight_core::traits::identity::IdentityResolver;
use spotlight_core::types::id::UserId;

/// Message returned for every failed login, so callers cannot probe usernames.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Repository for the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
    hasher: PasswordHasher,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hasher: PasswordHasher::new(),
        }
    }

    /// Find the username for a user id.
    pub async fn find_username(&self, id: UserId) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find the id and password hash for a username (case-insensitive).
    pub async fn find_credentials(&self, username: &str) -> AppResult<Option<(UserId, String)>> {
        sqlx::query_as::<_, (UserId, String)>(
            "SELECT id, password_hash FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
        })
    }
}

#[async_trait]
impl IdentityResolver for UserRepository {
    async fn username_for_id(&self, user_id: UserId) -> AppResult<String> {
        self.find_username(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserId> {
        let Some((user_id, hash)) = self.find_credentials(username).await? else {
            debug!(username = %username, "Login for unknown user");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if self.hasher.verify_password(password, &hash)? {
            Ok(user_id)
        } else {
            debug!(user_id = %user_id, "Login with wrong password");
            Err(AppError::authentication(INVALID_CREDENTIALS))
        }
    }
}
