//! Per-request identity resolution
//!
//! A missing, malformed, or expired bearer token, or one naming a user that no
//! longer exists, yields an anonymous context. Operations that need a user
//! reject anonymous contexts themselves.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use tracing::debug;

use crate::db::{Database, UserRecord};
use crate::services::tokens::TokenService;

/// Identity attached to one request; fixed once built
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    current_user: Option<UserRecord>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserRecord) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.current_user.as_ref()
    }
}

/// Extract bearer token from Authorization header
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Extract bearer token from a WebSocket `connection_init` payload
pub fn bearer_from_connection_params(params: &serde_json::Value) -> Option<String> {
    params
        .get("Authorization")
        .or_else(|| params.get("authorization"))
        .and_then(|v| v.as_str())
        .map(|t| t.strip_prefix("Bearer ").unwrap_or(t).trim().to_string())
}

#[derive(Clone)]
pub struct ContextBuilder {
    db: Database,
    tokens: TokenService,
}

impl ContextBuilder {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self { db, tokens }
    }

    /// Resolve an optional bearer token to a request context
    pub async fn build(&self, bearer: Option<&str>) -> RequestContext {
        let Some(token) = bearer.filter(|t| !t.is_empty()) else {
            debug!("No auth token in request");
            return RequestContext::anonymous();
        };

        let identity = match self.tokens.verify(token) {
            Ok(identity) => identity,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid token");
                return RequestContext::anonymous();
            }
        };

        match self.db.users().get_by_id(&identity.user_id).await {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "Request authenticated");
                RequestContext::authenticated(user)
            }
            Ok(None) => {
                debug!(user_id = %identity.user_id, "Token names an unknown user");
                RequestContext::anonymous()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load user for token");
                RequestContext::anonymous()
            }
        }
    }

    /// Build a context from HTTP request headers
    pub async fn from_headers(&self, headers: &HeaderMap) -> RequestContext {
        self.build(bearer_from_headers(headers).as_deref()).await
    }
}
