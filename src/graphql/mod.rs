//! GraphQL API with subscriptions for live book updates
//!
//! Queries and mutations are split per domain (`queries/`, `mutations/`) and
//! combined with `MergedObject` in `schema.rs`. Resolvers stay thin: they read
//! the request identity from the context and delegate to the services.

pub mod auth;
pub mod loaders;
pub mod mutations;
pub mod queries;
mod schema;
mod subscriptions;
pub mod types;

pub use auth::AuthExt;
pub use schema::{CatalogSchema, MutationRoot, QueryRoot, build_schema};
pub use subscriptions::SubscriptionRoot;
