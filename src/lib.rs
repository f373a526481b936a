//! Library catalog backend
//!
//! Authors, books and users behind a GraphQL API, with a `bookAdded`
//! subscription pushed over WebSocket.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod services;

pub use app::{AppState, build_app};
pub use error::{CatalogError, CatalogResult};
