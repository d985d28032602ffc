//! Auth state machine
//!
//! Orchestrates the credential lifecycle: registration, email verification,
//! the two-factor login handshake (password, then one-time code), password
//! reset, and profile retrieval. Collaborators are injected at construction;
//! the service holds no connection lifecycle of its own.
//!
//! State model per user: `PENDING_VERIFICATION -> VERIFIED` (one-way), and
//! independently `VERIFIED <-> PENDING_RESET`. A successful password check
//! opens a transient OTP window tracked only by the code cache.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditLog};
use crate::error::{AuthError, AuthResult};
use crate::jwt::JwtService;
use crate::mailer::{messages, Mailer};
use crate::models::{NewUser, UserProfile, VerificationState};
use crate::otp::{codes_match, generate_code, otp_key, CodeCache, OTP_TTL_SECONDS};
use crate::repositories::UserStore;

/// Hash a password with a freshly generated salt
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored hash
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {}", e))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// The authentication service
///
/// Generic over its store and cache so the state machine can run against
/// PostgreSQL/Redis in production and in-memory doubles in tests.
pub struct AuthService<S, C> {
    users: S,
    codes: C,
    mailer: Arc<dyn Mailer>,
    jwt: JwtService,
    audit: AuditLog,
    public_base_url: String,
}

impl<S: UserStore, C: CodeCache> AuthService<S, C> {
    pub fn new(
        users: S,
        codes: C,
        mailer: Arc<dyn Mailer>,
        jwt: JwtService,
        audit: AuditLog,
        public_base_url: String,
    ) -> Self {
        Self {
            users,
            codes,
            mailer,
            jwt,
            audit,
            public_base_url,
        }
    }

    /// Notification sends are best-effort: the preceding store write stays
    /// committed and the failure is only logged.
    async fn notify(&self, to: &str, subject: &str, body: &str) {
        if let Err(err) = self.mailer.send(to, subject, body).await {
            warn!(to = %to, error = %err, "notification send failed");
        }
    }

    /// Register a new user and dispatch the verification email
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<&'static str> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(password)?;
        let verification_token = Uuid::new_v4().to_string();

        let user = self
            .users
            .insert(NewUser {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password_hash,
                verification_token: verification_token.clone(),
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        self.audit.record(AuditEvent::UserRegistered { user_id: user.id });

        let (subject, body) = messages::verification(&self.public_base_url, &verification_token);
        self.notify(email, &subject, &body).await;

        Ok("Registration successful. Check your email to verify.")
    }

    /// Consume a verification token, proving email ownership
    pub async fn verify_email(&self, token: &str) -> AuthResult<&'static str> {
        let user = self
            .users
            .find_by_verification_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        self.users.mark_verified(user.id).await?;

        info!(user_id = %user.id, "email verified");
        self.audit.record(AuditEvent::EmailVerified { user_id: user.id });

        Ok("Email verified successfully")
    }

    /// First factor: check the password and issue a one-time code
    ///
    /// Absent user, unverified email, and wrong password all fail with the
    /// same error so callers cannot probe which emails are registered.
    /// Success stores a fresh code (overwriting any live one) and returns
    /// the user id for the second factor; no session token yet.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Uuid> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if let VerificationState::Pending { .. } = user.verification_state() {
            return Err(AuthError::InvalidCredentials);
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let code = generate_code();
        self.codes
            .set_ex(&otp_key(user.id), &code, OTP_TTL_SECONDS)
            .await?;

        info!(user_id = %user.id, "otp issued for login");
        self.audit.record(AuditEvent::OtpIssued { user_id: user.id });

        let (subject, body) = messages::login_otp(&code);
        self.notify(&user.email, &subject, &body).await;

        Ok(user.id)
    }

    /// Second factor: consume the one-time code and mint a session token
    pub async fn verify_otp(&self, user_id: Uuid, code: &str) -> AuthResult<String> {
        let key = otp_key(user_id);

        let stored = self
            .codes
            .get(&key)
            .await?
            .ok_or(AuthError::OtpExpiredOrMissing)?;

        if !codes_match(code, &stored) {
            return Err(AuthError::InvalidOtp);
        }

        // Single use: the code dies on first successful match.
        self.codes.delete(&key).await?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        let token = self.jwt.issue(&user)?;

        info!(user_id = %user.id, "login completed");
        self.audit.record(AuditEvent::LoginSucceeded { user_id: user.id });

        Ok(token)
    }

    /// Issue a reset token, overwriting any outstanding one
    pub async fn forgot_password(&self, email: &str) -> AuthResult<&'static str> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound)?;

        let reset_token = Uuid::new_v4().to_string();
        self.users.set_reset_token(user.id, &reset_token).await?;

        info!(user_id = %user.id, "password reset requested");
        self.audit
            .record(AuditEvent::PasswordResetRequested { user_id: user.id });

        let (subject, body) = messages::password_reset(&self.public_base_url, &reset_token);
        self.notify(&user.email, &subject, &body).await;

        Ok("Reset link sent to your email")
    }

    /// Consume a reset token and store the new password
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AuthResult<&'static str> {
        let user = self
            .users
            .find_by_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let password_hash = hash_password(new_password)?;
        self.users.update_password(user.id, &password_hash).await?;

        info!(user_id = %user.id, "password reset completed");
        self.audit.record(AuditEvent::PasswordReset { user_id: user.id });

        Ok("Password reset successfully")
    }

    /// Non-sensitive profile projection
    pub async fn get_profile(&self, user_id: Uuid) -> AuthResult<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        self.audit.record(AuditEvent::ProfileAccessed { user_id: user.id });

        Ok(user.profile())
    }
}
