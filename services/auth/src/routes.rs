//! HTTP routes for the authentication service
//!
//! Pure glue: deserialize, validate, call the state machine, and let
//! `AuthError`'s `IntoResponse` impl translate typed failures to wire
//! status codes.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::jwt::Claims;
use crate::middleware::{self, require_role};
use crate::models::{Role, UserProfile};
use crate::validation::{validate_email, validate_full_name, validate_password};
use crate::AppState;

/// Request for user registration
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Request for the first login factor
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request for the second login factor
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: Uuid,
    pub otp: String,
}

/// Request for a password reset link
#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body for the password reset itself; the token travels in the query
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Single-use token passed in the query string
#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Generic acknowledgement payload
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for a successful first factor
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// Response carrying a freshly minted session token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/profile", get(get_profile))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/verify", get(verify_email))
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

fn validated(result: Result<(), String>) -> AuthResult<()> {
    result.map_err(AuthError::Validation)
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    validated(validate_full_name(&payload.full_name))?;
    validated(validate_email(&payload.email))?;
    validated(validate_password(&payload.password))?;

    let message = state
        .auth_service
        .register(&payload.full_name, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    ))
}

/// Consume an email verification token
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> AuthResult<impl IntoResponse> {
    let message = state.auth_service.verify_email(&query.token).await?;

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// First login factor: password check, OTP dispatch
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    validated(validate_email(&payload.email))?;
    if payload.password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }

    let user_id = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "OTP sent to your email".to_string(),
        user_id,
    }))
}

/// Second login factor: consume the OTP, mint the session token
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AuthResult<impl IntoResponse> {
    let token = state
        .auth_service
        .verify_otp(payload.user_id, &payload.otp)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// Request a password reset link
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AuthResult<impl IntoResponse> {
    validated(validate_email(&payload.email))?;

    let message = state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Consume a reset token and store the new password
pub async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse> {
    validated(validate_password(&payload.new_password))?;

    let message = state
        .auth_service
        .reset_password(&query.token, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// Authenticated profile fetch
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AuthResult<Json<UserProfile>> {
    require_role(&claims, &[Role::User, Role::Admin])?;

    let profile = state.auth_service.get_profile(claims.sub).await?;

    Ok(Json(profile))
}
