//! Session token issuing and verification
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`) and username, signed
//! with the server-held secret and valid for a fixed window.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Identity claim embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub username: String,
}

/// Claims structure for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    /// User ID (subject)
    sub: String,
    username: String,
    /// Expiration timestamp
    exp: i64,
    /// Issued at timestamp
    iat: i64,
}

/// Token service configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 1 hour)
    pub token_lifetime: i64,
}

impl TokenConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_lifetime: 60 * 60,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    config: Arc<TokenConfig>,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Sign `identity` into a token expiring after the configured lifetime
    pub fn issue(&self, identity: &SessionIdentity) -> Result<String> {
        let now = Utc::now();
        let expires = Duration::try_seconds(self.config.token_lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                anyhow!("Token lifetime of {}s is out of range", self.config.token_lifetime)
            })?;
        let claims = SessionClaims {
            sub: identity.user_id.clone(),
            username: identity.username.clone(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow!("Failed to create session token: {}", e))
    }

    /// Check signature and expiry, returning the embedded identity
    pub fn verify(&self, token: &str) -> Result<SessionIdentity, CatalogError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            CatalogError::InvalidToken(e.to_string())
        })?;

        Ok(SessionIdentity {
            user_id: token_data.claims.sub,
            username: token_data.claims.username,
        })
    }
}
