//! Authentication service for user registration and login
//!
//! Login runs in single shared-secret mode: users have no stored password and
//! every account accepts the one configured secret. The returned token is the
//! only credential the rest of the API looks at.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::{CreateUser, Database, UserRecord};
use crate::error::{CatalogError, CatalogResult};
use crate::services::tokens::{SessionIdentity, TokenService};

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The password accepted for every account
    pub login_shared_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_shared_secret: "secret".to_string(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: TokenService,
    config: Arc<AuthConfig>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(db: Database, tokens: TokenService, config: AuthConfig) -> Self {
        Self {
            db,
            tokens,
            config: Arc::new(config),
        }
    }

    /// Register a new user. No authentication required.
    pub async fn create_user(
        &self,
        username: &str,
        favorite_genre: &str,
    ) -> CatalogResult<UserRecord> {
        let user = self
            .db
            .users()
            .create(CreateUser {
                username: username.to_string(),
                favorite_genre: favorite_genre.to_string(),
            })
            .await
            .map_err(|e| {
                warn!(username = %username, error = %e, "Creating the user failed");
                CatalogError::user_input("Creating the user failed", username, e)
            })?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, username: &str, password: &str) -> CatalogResult<String> {
        let user = self.db.users().get_by_username(username).await?;

        let user = match user {
            Some(u) if password == self.config.login_shared_secret => u,
            _ => {
                warn!(username = %username, "Login failed");
                return Err(CatalogError::Authentication);
            }
        };

        let token = self.tokens.issue(&SessionIdentity {
            user_id: user.id.clone(),
            username: user.username.clone(),
        })?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(token)
    }
}
