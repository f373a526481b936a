//! GraphQL DataLoaders for batching database queries
//!
//! `Author.bookCount` goes through [`BookCountLoader`]: every author in one
//! response is counted by a single `GROUP BY author_id` query over the indexed
//! column instead of one query per author.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::Database;

/// Batches book counts keyed by author id
pub struct BookCountLoader {
    db: Database,
}

impl BookCountLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<String> for BookCountLoader {
    type Value = i64;
    type Error = Arc<anyhow::Error>;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        tracing::debug!(author_count = keys.len(), "Batch loading book counts");

        let counts = self
            .db
            .books()
            .count_by_authors(keys)
            .await
            .map_err(Arc::new)?;

        Ok(keys
            .iter()
            .map(|id| (id.clone(), counts.get(id).copied().unwrap_or(0)))
            .collect())
    }
}
