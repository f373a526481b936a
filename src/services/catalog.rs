//! Catalog service: authors, books, and book-added notifications
//!
//! Holds the catalog rules the GraphQL layer delegates to: find-or-create of
//! authors on book insert, authenticated-only writes, combined book filtering,
//! and publishing each added book to live subscribers.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::db::{AuthorRecord, BookFilter, BookWithAuthor, CreateBook, Database, UserRecord};
use crate::error::{CatalogError, CatalogResult};
use crate::services::notifier::{ChangeNotifier, Subscription, Topic};

/// Input for adding a book
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published: i32,
    pub genres: Vec<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    notifier: ChangeNotifier<BookWithAuthor>,
}

impl CatalogService {
    pub fn new(db: Database, notifier: ChangeNotifier<BookWithAuthor>) -> Self {
        Self { db, notifier }
    }

    pub async fn book_count(&self) -> CatalogResult<i64> {
        Ok(self.db.books().count().await?)
    }

    pub async fn author_count(&self) -> CatalogResult<i64> {
        Ok(self.db.authors().count().await?)
    }

    /// All authors in insertion order
    pub async fn all_authors(&self) -> CatalogResult<Vec<AuthorRecord>> {
        Ok(self.db.authors().list_all().await?)
    }

    /// Books matching both filters when given.
    ///
    /// An author name with no matching author yields an empty list.
    pub async fn all_books(
        &self,
        author: Option<&str>,
        genre: Option<&str>,
    ) -> CatalogResult<Vec<BookWithAuthor>> {
        let author_id = match author {
            Some(name) => match self.db.authors().get_by_name(name).await? {
                Some(found) => Some(found.id),
                None => {
                    debug!(author = %name, "No such author, empty book list");
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        let filter = BookFilter {
            author_id,
            genre: genre.map(str::to_string),
        };
        Ok(self.db.books().list(&filter).await?)
    }

    /// Distinct genres across all books, first-seen order
    pub async fn all_genres(&self) -> CatalogResult<Vec<String>> {
        let mut seen = HashSet::new();
        let genres = self
            .db
            .books()
            .all_genre_lists()
            .await?
            .into_iter()
            .flatten()
            .filter(|g| seen.insert(g.clone()))
            .collect();
        Ok(genres)
    }

    /// Add a book, creating its author on first use, and notify subscribers.
    ///
    /// Requires an authenticated user; nothing is written otherwise.
    pub async fn add_book(
        &self,
        current_user: Option<&UserRecord>,
        input: NewBook,
    ) -> CatalogResult<BookWithAuthor> {
        let user = current_user.ok_or(CatalogError::Authorization)?;

        let (author, created) = self
            .db
            .authors()
            .find_or_create(&input.author)
            .await
            .map_err(|e| {
                warn!(author = %input.author, error = %e, "Saving author failed");
                CatalogError::user_input("Saving book failed", &input.author, e)
            })?;
        if created {
            info!(author_id = %author.id, author = %author.name, "Author created");
        }

        let book_id = self
            .db
            .books()
            .create(CreateBook {
                title: input.title.clone(),
                published: input.published,
                genres: input.genres,
                author_id: author.id.clone(),
            })
            .await
            .map_err(|e| {
                warn!(
                    author = %input.author,
                    title = %input.title,
                    error = %e,
                    "Saving book failed"
                );
                CatalogError::user_input("Saving book failed", &input.author, e)
            })?;

        let book = self
            .db
            .books()
            .get_with_author(&book_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Book {} missing after insert", book_id))?;

        let delivered = self.notifier.publish(Topic::BookAdded, book.clone());
        info!(
            book_id = %book.book.id,
            title = %book.book.title,
            author = %book.author.name,
            user_id = %user.id,
            subscribers = delivered,
            "Book added"
        );

        Ok(book)
    }

    /// Set an author's birth year. `None` when no author has that name.
    pub async fn edit_author(
        &self,
        current_user: Option<&UserRecord>,
        name: &str,
        born: i32,
    ) -> CatalogResult<Option<AuthorRecord>> {
        let user = current_user.ok_or(CatalogError::Authorization)?;

        let Some(author) = self.db.authors().get_by_name(name).await? else {
            debug!(author = %name, "Edit skipped, no such author");
            return Ok(None);
        };

        let updated = self
            .db
            .authors()
            .update_born(&author.id, born)
            .await
            .map_err(|e| {
                warn!(author = %name, born, error = %e, "Saving date failed");
                CatalogError::user_input("Saving date failed", born, e)
            })?;

        info!(author_id = %author.id, born, user_id = %user.id, "Author birth year set");
        Ok(updated)
    }

    /// Live stream of every book added from now on
    pub fn subscribe_book_added(&self) -> Subscription<BookWithAuthor> {
        self.notifier.subscribe(Topic::BookAdded)
    }

    /// Open `bookAdded` subscriptions
    pub fn book_added_subscribers(&self) -> usize {
        self.notifier.subscriber_count(Topic::BookAdded)
    }
}
