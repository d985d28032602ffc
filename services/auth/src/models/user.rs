//! User model and derived account states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// User entity as stored in the credential store
///
/// `verification_token` and `reset_token` are present only while the
/// corresponding flow is pending; both are cleared exactly once, on the
/// successful transition. Prefer [`User::verification_state`] and
/// [`User::reset_state`] over inspecting the options directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub reset_token: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload
///
/// Always enters the store unverified with a pending verification token;
/// role defaults to USER at the store level.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
}

/// Email verification state, derived from the stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    /// Registration happened but the email was never confirmed
    Pending { token: String },
    /// Email ownership proven; this state is terminal
    Verified,
}

/// Password reset state, derived from the stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetState {
    /// No reset request outstanding
    Idle,
    /// A reset token was issued and not yet consumed
    Requested { token: String },
}

impl User {
    /// Derive the verification state from the stored fields
    pub fn verification_state(&self) -> VerificationState {
        if self.is_verified {
            VerificationState::Verified
        } else {
            // Unverified users always carry their pending token.
            VerificationState::Pending {
                token: self.verification_token.clone().unwrap_or_default(),
            }
        }
    }

    /// Derive the reset state from the stored fields
    pub fn reset_state(&self) -> ResetState {
        match &self.reset_token {
            Some(token) => ResetState::Requested {
                token: token.clone(),
            },
            None => ResetState::Idle,
        }
    }

    /// Non-sensitive projection of this record
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Public view of a user
///
/// This is the only user shape that ever crosses the API boundary; the
/// password hash and both tokens stay behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_verified: false,
            verification_token: Some("tok-123".to_string()),
            reset_token: None,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn verification_state_tracks_stored_fields() {
        let mut user = sample_user();
        assert_eq!(
            user.verification_state(),
            VerificationState::Pending {
                token: "tok-123".to_string()
            }
        );

        user.is_verified = true;
        user.verification_token = None;
        assert_eq!(user.verification_state(), VerificationState::Verified);
    }

    #[test]
    fn reset_state_tracks_stored_fields() {
        let mut user = sample_user();
        assert_eq!(user.reset_state(), ResetState::Idle);

        user.reset_token = Some("reset-1".to_string());
        assert_eq!(
            user.reset_state(),
            ResetState::Requested {
                token: "reset-1".to_string()
            }
        );
    }

    #[test]
    fn profile_exposes_no_sensitive_fields() {
        let user = sample_user();
        let json = serde_json::to_value(user.profile()).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["id", "fullName", "email", "role", "createdAt"] {
            assert!(obj.contains_key(key), "missing expected key {}", key);
        }
        for key in [
            "passwordHash",
            "password_hash",
            "verificationToken",
            "resetToken",
        ] {
            assert!(!obj.contains_key(key), "leaked sensitive key {}", key);
        }
    }
}
