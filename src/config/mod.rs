//! Application configuration management

use std::env;

use anyhow::{Context, Result, bail};
use base64::Engine;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (for generating URLs)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// SQLite connection URL
    pub database_url: String,

    /// Maximum pooled database connections
    pub database_max_connections: u32,

    /// JWT signing secret for session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub token_lifetime_secs: i64,

    /// The single password accepted by `login` for every user
    pub login_shared_secret: String,

    /// Per-subscriber queue capacity for live notifications
    pub notifier_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = env::var("DATABASE_PATH")
            .map(|path| format!("sqlite:{}", path))
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "sqlite:./data/library.db".to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().to_string(),
            _ => {
                tracing::warn!("JWT_SECRET not set; tokens will not survive a restart");
                generate_dev_secret()
            }
        };

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            jwt_secret,

            token_lifetime_secs: parse_token_lifetime(env::var("TOKEN_LIFETIME_SECS").ok())?,

            login_shared_secret: env::var("LOGIN_SHARED_SECRET")
                .unwrap_or_else(|_| "secret".to_string()),

            notifier_queue_capacity: env::var("NOTIFIER_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .context("Invalid NOTIFIER_QUEUE_CAPACITY")?,
        })
    }
}

/// Longest accepted session token lifetime: one year
const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

fn parse_token_lifetime(raw: Option<String>) -> Result<i64> {
    let secs: i64 = raw
        .as_deref()
        .unwrap_or("3600")
        .trim()
        .parse()
        .context("Invalid TOKEN_LIFETIME_SECS")?;

    if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&secs) {
        bail!(
            "TOKEN_LIFETIME_SECS must be between 1 and {}, got {}",
            MAX_TOKEN_LIFETIME_SECS,
            secs
        );
    }
    Ok(secs)
}

fn generate_dev_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
