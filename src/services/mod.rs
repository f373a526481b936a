//! Catalog, identity, token and notification services

pub mod auth;
pub mod catalog;
pub mod context;
pub mod notifier;
pub mod tokens;

pub use auth::{AuthConfig, AuthService};
pub use catalog::{CatalogService, NewBook};
pub use context::{
    ContextBuilder, RequestContext, bearer_from_connection_params, bearer_from_headers,
};
pub use notifier::{ChangeNotifier, NotifierConfig, Subscription, Topic};
pub use tokens::{SessionIdentity, TokenConfig, TokenService};
