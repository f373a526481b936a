//! GraphQL object types

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, ID, Result, SimpleObject};

use crate::db::{AuthorRecord, BookWithAuthor, UserRecord};

use super::loaders::BookCountLoader;

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Author {
    pub id: ID,
    pub name: String,
    /// Birth year, if known
    pub born: Option<i32>,
}

#[ComplexObject]
impl Author {
    /// Number of books referencing this author
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let loader = ctx.data_unchecked::<DataLoader<BookCountLoader>>();
        Ok(loader.load_one(self.id.to_string()).await?.unwrap_or(0))
    }
}

impl From<AuthorRecord> for Author {
    fn from(r: AuthorRecord) -> Self {
        Self {
            id: ID(r.id),
            name: r.name,
            born: r.born,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Book {
    pub id: ID,
    pub title: String,
    pub published: i32,
    pub genres: Vec<String>,
    pub author: Author,
}

impl From<BookWithAuthor> for Book {
    fn from(r: BookWithAuthor) -> Self {
        Self {
            id: ID(r.book.id),
            title: r.book.title,
            published: r.book.published,
            genres: r.book.genres,
            author: r.author.into(),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: ID,
    pub username: String,
    pub favorite_genre: String,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: ID(r.id),
            username: r.username,
            favorite_genre: r.favorite_genre,
        }
    }
}

/// Signed session token returned by `login`
#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    /// Send as `Authorization: Bearer <value>`
    pub value: String,
}
