//! Library Backend - catalog service entry point
//!
//! All operations are exposed via GraphQL at /graphql, with subscriptions on
//! /graphql/ws.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_backend::config::Config;
use library_backend::db::Database;
use library_backend::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Library Backend");

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    db.migrate().await?;
    tracing::info!(database_url = %config.database_url, "Database connected");

    let state = AppState::new(&config, db);
    tracing::info!("GraphQL schema built");

    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let host = config.host.as_deref().unwrap_or("localhost");
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://{}:{}/graphql", host, config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
