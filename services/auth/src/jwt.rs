//! Session token issuance and verification
//!
//! Tokens are stateless HS256-signed claim sets carrying identity and role,
//! verified by signature and expiry only. There is no server-side
//! revocation list and no refresh flow.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::{Role, User};

/// Session token lifetime, fixed at one hour
pub const TOKEN_TTL_SECONDS: u64 = 3600;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric signing secret
    pub secret: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Symmetric signing secret (required)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;
        Ok(JwtConfig { secret })
    }
}

/// Claim set carried by every session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email at issuance time
    pub email: String,
    /// User role at issuance time
    pub role: Role,
    /// Issued-at, seconds since the epoch
    pub iat: u64,
    /// Expiry, always `iat` + one hour
    pub exp: u64,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Build the service from configuration
    pub fn new(config: &JwtConfig) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    fn now() -> Result<u64> {
        Ok(SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before unix epoch")?
            .as_secs())
    }

    /// Mint a session token for a user
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Self::now()?;
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + TOKEN_TTL_SECONDS,
        };

        encode(&Header::default(), &claims, &self.encoding_key).context("token signing failed")
    }

    /// Validate a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("token validation failed")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-at-least-32-bytes-long!".to_string(),
        })
    }

    fn verified_user() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_verified: true,
            verification_token: None,
            reset_token: None,
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let jwt = service();
        let user = verified_user();

        let token = jwt.issue(&user).expect("issue token");
        let claims = jwt.verify(&token).expect("verify token");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let user = verified_user();
        let token = service().issue(&user).expect("issue token");

        let other = JwtService::new(&JwtConfig {
            secret: "a-completely-different-secret-value".to_string(),
        });
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let jwt = service();
        let token = jwt.issue(&verified_user()).expect("issue token");

        let mut tampered = token.clone();
        tampered.pop();
        assert!(jwt.verify(&tampered).is_err());
    }
}
