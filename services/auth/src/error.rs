//! Error taxonomy for the authentication service
//!
//! Every operation of the auth state machine fails with one of these kinds;
//! the HTTP layer maps them to wire status codes in one place. Store and
//! cache connectivity failures travel as `Infrastructure` and never leak
//! internals to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::StoreError;

/// Error type for authentication operations
#[derive(Error, Debug)]
pub enum AuthError {
    /// Registration with an email that already exists
    #[error("User already exists")]
    Conflict,

    /// Login failure: absent user, unverified email, or wrong password.
    /// Deliberately one kind for all three causes.
    #[error("Invalid credentials or unverified email")]
    InvalidCredentials,

    /// Bad or already-consumed verification/reset token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// No live one-time code for this user
    #[error("OTP expired or not found")]
    OtpExpiredOrMissing,

    /// A live code exists but does not match
    #[error("Invalid OTP")]
    InvalidOtp,

    /// User lookup miss
    #[error("User not found")]
    NotFound,

    /// Missing or invalid bearer token
    #[error("Invalid or missing authentication token")]
    Unauthenticated,

    /// Authenticated but lacking the required role
    #[error("Forbidden: insufficient role")]
    Forbidden,

    /// Request rejected before reaching the state machine
    #[error("{0}")]
    Validation(String),

    /// Store/cache connectivity or other non-domain failure
    #[error("Internal server error")]
    Infrastructure(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::Conflict,
            StoreError::Other(e) => AuthError::Infrastructure(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::OtpExpiredOrMissing
            | AuthError::InvalidOtp
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Infrastructure(ref e) => {
                tracing::error!(error = %e, "infrastructure failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
