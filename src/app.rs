//! Application state and HTTP router construction.
//!
//! Services are constructed once here and injected into the schema; nothing
//! is held in process-global state.

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::{CatalogSchema, build_schema};
use crate::services::{
    AuthConfig, AuthService, CatalogService, ChangeNotifier, ContextBuilder, NotifierConfig,
    TokenConfig, TokenService,
};

/// Shared state for HTTP handlers (GraphQL, health routes).
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub schema: CatalogSchema,
    pub catalog: CatalogService,
    pub context_builder: ContextBuilder,
}

impl AppState {
    /// Wire every service from configuration and an opened database
    pub fn new(config: &Config, db: Database) -> Self {
        let tokens = TokenService::new(TokenConfig {
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime: config.token_lifetime_secs,
        });
        let notifier = ChangeNotifier::new(NotifierConfig {
            queue_capacity: config.notifier_queue_capacity,
        });

        let catalog = CatalogService::new(db.clone(), notifier);
        let auth = AuthService::new(
            db.clone(),
            tokens.clone(),
            AuthConfig {
                login_shared_secret: config.login_shared_secret.clone(),
            },
        );
        let schema = build_schema(catalog.clone(), auth, db.clone());
        let context_builder = ContextBuilder::new(db.clone(), tokens);

        Self {
            db,
            schema,
            catalog,
            context_builder,
        }
    }
}

/// Build the full Axum router: /graphql, /graphql/ws, health probes and layers.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(crate::api::health::router())
        .merge(crate::api::graphql::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
