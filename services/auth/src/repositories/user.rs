//! PostgreSQL implementation of the credential store

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, User};

/// User repository backed by the `users` table
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

const USER_COLUMNS: &str = "id, full_name, email, password_hash, is_verified, \
     verification_token, reset_token, role, created_at, updated_at";

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = $1"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("user lookup by {column} failed"))?;
        Ok(user)
    }
}

/// True when the database rejected the write over a unique constraint
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, new_user: NewUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (full_name, email, password_hash, verification_token) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&new_user.full_name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.verification_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate
                } else {
                    StoreError::Other(anyhow::Error::new(e).context("user insert failed"))
                }
            })?;

        info!(user_id = %user.id, "user record created");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_by_column("email", email).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("user lookup by id failed")?;
        Ok(user)
    }

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<User>> {
        self.find_by_column("verification_token", token).await
    }

    async fn find_by_reset_token(&self, token: &str) -> StoreResult<Option<User>> {
        self.find_by_column("reset_token", token).await
    }

    async fn mark_verified(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users \
             SET is_verified = TRUE, verification_token = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .context("marking user verified failed")?;
        Ok(())
    }

    async fn set_reset_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET reset_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await
        .context("storing reset token failed")?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users \
             SET password_hash = $2, reset_token = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .context("password update failed")?;
        Ok(())
    }
}
