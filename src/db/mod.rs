//! Database connection and operations
//!
//! The catalog store (authors, books) and the identity store (users) share one
//! SQLite pool. Each repository is a cheap handle created per call.

pub mod authors;
pub mod books;
pub mod sqlite_helpers;
pub mod users;

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use authors::{AuthorRecord, AuthorRepository};
pub use books::{BookFilter, BookRecord, BookRepository, BookWithAuthor, CreateBook};
pub use users::{CreateUser, UserRecord, UsersRepository};

/// Schema statements, applied idempotently on startup
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE,
        born INTEGER,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        published INTEGER NOT NULL,
        genres TEXT NOT NULL DEFAULT '[]',
        author_id TEXT NOT NULL REFERENCES authors(id),
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id)",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        favorite_genre TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the SQLite database at `url`, creating the file if missing
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        ensure_parent_dir(url)?;

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL: {}", url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and ephemeral runs.
    ///
    /// Pinned to one connection that never idles out: every SQLite connection
    /// to `:memory:` opens its own empty database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get an author repository
    pub fn authors(&self) -> AuthorRepository {
        AuthorRepository::new(self.pool.clone())
    }

    /// Get a book repository
    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    /// Get a users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    /// Create missing tables and indexes
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Schema migration failed")?;
        }
        tracing::debug!(statements = SCHEMA.len(), "Database schema up to date");
        Ok(())
    }

    /// Cheap liveness probe for the health endpoint
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create the directory holding a file-backed database
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Fresh migrated in-memory database for unit tests
#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    let db = Database::connect_in_memory()
        .await
        .expect("in-memory database");
    db.migrate().await.expect("migrate");
    db
}
