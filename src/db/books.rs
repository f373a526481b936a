//! Books repository
//!
//! Books reference their author by id; reads join the author row in so every
//! returned book carries a resolved author.

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::authors::AuthorRecord;
use super::sqlite_helpers::{json_array_contains_sql, json_to_vec, new_id, now_iso8601, vec_to_json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author_id: String,
    pub created_at: String,
}

/// A book joined with the author it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookWithAuthor {
    pub book: BookRecord,
    pub author: AuthorRecord,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author_id: String,
}

/// Combined filter; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub author_id: Option<String>,
    pub genre: Option<String>,
}

#[derive(FromRow)]
struct BookRow {
    id: String,
    title: String,
    published: i32,
    genres: String,
    author_id: String,
    created_at: String,
    author_name: String,
    author_born: Option<i32>,
    author_created_at: String,
}

impl From<BookRow> for BookWithAuthor {
    fn from(r: BookRow) -> Self {
        Self {
            author: AuthorRecord {
                id: r.author_id.clone(),
                name: r.author_name,
                born: r.author_born,
                created_at: r.author_created_at,
            },
            book: BookRecord {
                id: r.id,
                title: r.title,
                published: r.published,
                genres: json_to_vec(&r.genres),
                author_id: r.author_id,
                created_at: r.created_at,
            },
        }
    }
}

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT b.id, b.title, b.published, b.genres, b.author_id, b.created_at,
           a.name AS author_name, a.born AS author_born, a.created_at AS author_created_at
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a book and return its id
    pub async fn create(&self, book: CreateBook) -> Result<String> {
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO books (id, title, published, genres, author_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&book.title)
        .bind(book.published)
        .bind(vec_to_json(&book.genres))
        .bind(&book.author_id)
        .bind(now_iso8601())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Get a book with its author resolved
    pub async fn get_with_author(&self, id: &str) -> Result<Option<BookWithAuthor>> {
        let sql = format!("{} WHERE b.id = ?", SELECT_WITH_AUTHOR);
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// List books matching every set field of `filter`, in insertion order
    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<BookWithAuthor>> {
        let mut conditions = Vec::new();
        if filter.author_id.is_some() {
            conditions.push("b.author_id = ?".to_string());
        }
        if filter.genre.is_some() {
            conditions.push(json_array_contains_sql("b.genres"));
        }

        let mut sql = SELECT_WITH_AUTHOR.to_string();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY b.rowid");

        let mut query = sqlx::query_as::<_, BookRow>(&sql);
        if let Some(author_id) = &filter.author_id {
            query = query.bind(author_id);
        }
        if let Some(genre) = &filter.genre {
            query = query.bind(genre);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count all books
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books per author for a batch of author ids.
    ///
    /// Authors without books are absent from the map.
    pub async fn count_by_authors(&self, author_ids: &[String]) -> Result<HashMap<String, i64>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let sql = format!(
            "SELECT author_id, COUNT(*) FROM books WHERE author_id IN ({}) GROUP BY author_id",
            placeholders
        );

        let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
        for id in author_ids {
            query = query.bind(id);
        }

        Ok(query.fetch_all(&self.pool).await?.into_iter().collect())
    }

    /// Genre lists of every book, in insertion order
    pub async fn all_genre_lists(&self) -> Result<Vec<Vec<String>>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT genres FROM books ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(g,)| json_to_vec(&g)).collect())
    }
}
