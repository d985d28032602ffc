//! Authentication service
//!
//! Email/password registration with mandatory email verification, a
//! two-factor login handshake (password, then a short-lived one-time code),
//! password reset, and stateless session tokens. PostgreSQL holds the
//! credential records, Redis holds the live one-time codes, and outbound
//! email is best-effort.

use std::sync::Arc;

pub mod audit;
pub mod error;
pub mod jwt;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod validation;

/// The production service wiring: PostgreSQL store, Redis code cache
pub type LiveAuthService =
    service::AuthService<repositories::UserRepository, common::cache::RedisPool>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<LiveAuthService>,
    pub jwt_service: jwt::JwtService,
}
