//! Authors repository

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::sqlite_helpers::{new_id, now_iso8601};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub born: Option<i32>,
    pub created_at: String,
}

pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<AuthorRecord>> {
        let record = sqlx::query_as::<_, AuthorRecord>(
            "SELECT id, name, born, created_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Get author by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<AuthorRecord>> {
        let record = sqlx::query_as::<_, AuthorRecord>(
            "SELECT id, name, born, created_at FROM authors WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Find the author with `name`, creating it (with no birth year) if absent.
    ///
    /// The insert is a single `ON CONFLICT DO NOTHING` statement against the
    /// unique name column, so concurrent callers for the same new name all end
    /// up with the one row that won. Returns the record and whether this call
    /// created it.
    pub async fn find_or_create(&self, name: &str) -> Result<(AuthorRecord, bool)> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO authors (id, name, born, created_at)
            VALUES (?, ?, NULL, ?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(new_id())
        .bind(name)
        .bind(now_iso8601())
        .execute(&self.pool)
        .await?
        .rows_affected()
            > 0;

        let record = self
            .get_by_name(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Author '{}' missing after upsert", name))?;

        Ok((record, inserted))
    }

    /// List all authors in insertion order
    pub async fn list_all(&self) -> Result<Vec<AuthorRecord>> {
        let records = sqlx::query_as::<_, AuthorRecord>(
            "SELECT id, name, born, created_at FROM authors ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Set the birth year and return the updated row
    pub async fn update_born(&self, id: &str, born: i32) -> Result<Option<AuthorRecord>> {
        sqlx::query("UPDATE authors SET born = ? WHERE id = ?")
            .bind(born)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(id).await
    }

    /// Count all authors
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
