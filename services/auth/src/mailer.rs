//! Notification gateway
//!
//! The state machine hands finished messages to a [`Mailer`] and treats
//! delivery as best-effort: a failed send is logged by the caller, never
//! surfaced to the client, and never rolls back the store write that
//! preceded it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Outbound message delivery
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message or return an error for the caller to log
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Mail provider endpoint; when unset, messages are logged instead
    pub endpoint: Option<String>,
    /// Sender address stamped on every message
    pub from_address: String,
    /// Base URL embedded in verification and reset links
    pub public_base_url: String,
}

impl MailerConfig {
    /// Create a new MailerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MAIL_ENDPOINT`: provider URL to POST messages to (optional; log-only when unset)
    /// - `MAIL_FROM`: sender address (default: "no-reply@localhost")
    /// - `PUBLIC_BASE_URL`: base URL for links (default: "http://localhost:3000")
    pub fn from_env() -> Self {
        MailerConfig {
            endpoint: std::env::var("MAIL_ENDPOINT").ok(),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@localhost".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Mailer that POSTs messages as JSON to an HTTP mail provider
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    from_address: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, from_address: String) -> Self {
        HttpMailer {
            client: reqwest::Client::new(),
            endpoint,
            from_address,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = OutboundMessage {
            from: &self.from_address,
            to,
            subject,
            body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .context("mail provider request failed")?;

        response
            .error_for_status()
            .context("mail provider rejected the message")?;

        info!(to = %to, subject = %subject, "email dispatched");
        Ok(())
    }
}

/// Local-dev mailer that logs the message and reports success
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(to = %to, subject = %subject, body = %body, "email send stub");
        Ok(())
    }
}

/// Pick the mailer implementation from configuration
pub fn from_config(config: &MailerConfig) -> std::sync::Arc<dyn Mailer> {
    match &config.endpoint {
        Some(endpoint) => std::sync::Arc::new(HttpMailer::new(
            endpoint.clone(),
            config.from_address.clone(),
        )),
        None => std::sync::Arc::new(LogMailer),
    }
}

/// Message builders shared by the auth flows
pub mod messages {
    /// Verification email pointing at the verify endpoint
    pub fn verification(base_url: &str, token: &str) -> (String, String) {
        (
            "Verify Your Email".to_string(),
            format!("Verify your email: {}/api/auth/verify?token={}", base_url, token),
        )
    }

    /// One-time login code, valid for five minutes
    pub fn login_otp(code: &str) -> (String, String) {
        (
            "Your Login OTP".to_string(),
            format!("Your OTP is: {}. Valid for 5 minutes.", code),
        )
    }

    /// Password reset email pointing at the reset endpoint
    pub fn password_reset(base_url: &str, token: &str) -> (String, String) {
        (
            "Reset Your Password".to_string(),
            format!(
                "Reset your password: {}/api/auth/reset-password?token={}",
                base_url, token
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_embed_tokens_and_base_url() {
        let (subject, body) = messages::verification("http://localhost:3000", "tok-1");
        assert_eq!(subject, "Verify Your Email");
        assert!(body.contains("http://localhost:3000/api/auth/verify?token=tok-1"));

        let (_, body) = messages::login_otp("042137");
        assert!(body.contains("042137"));
        assert!(body.contains("5 minutes"));

        let (_, body) = messages::password_reset("https://auth.example.com", "tok-2");
        assert!(body.contains("https://auth.example.com/api/auth/reset-password?token=tok-2"));
    }
}
