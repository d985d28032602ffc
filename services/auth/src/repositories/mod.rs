//! Credential store access
//!
//! The auth state machine talks to the store through the [`UserStore`]
//! trait; [`user::UserRepository`] is the PostgreSQL implementation and
//! [`memory::InMemoryUserStore`] backs tests and local experiments.

pub mod memory;
pub mod user;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, User};

pub use memory::InMemoryUserStore;
pub use user::UserRepository;

/// Error type for credential store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violated on insert
    #[error("duplicate key")]
    Duplicate,

    /// Connectivity or query failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable record of users, keyed by id, email, and the two opaque tokens
///
/// Every mutation is a single-record write; the store maintains
/// `updated_at` on each one.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new unverified user; fails with [`StoreError::Duplicate`]
    /// when the email is already taken
    async fn insert(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<User>>;

    async fn find_by_reset_token(&self, token: &str) -> StoreResult<Option<User>>;

    /// Set `is_verified` and clear the verification token
    async fn mark_verified(&self, id: Uuid) -> StoreResult<()>;

    /// Store a reset token, overwriting any outstanding one
    async fn set_reset_token(&self, id: Uuid, token: &str) -> StoreResult<()>;

    /// Store a new password hash and clear the reset token
    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()>;
}
