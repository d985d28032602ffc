//! In-memory credential store
//!
//! Backs the state-machine tests and local experiments with the same
//! semantics as the PostgreSQL repository: unique emails, single-record
//! writes, `updated_at` maintained on every mutation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, Role, User};

/// Credential store held entirely in process memory
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.lock().await;

        if users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Duplicate);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_verified: false,
            verification_token: Some(new_user.verification_token),
            reset_token: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> StoreResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn mark_verified(&self, id: Uuid) -> StoreResult<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&id) {
            user.is_verified = true;
            user.verification_token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_reset_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&id) {
            user.reset_token = Some(token.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.reset_token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}
