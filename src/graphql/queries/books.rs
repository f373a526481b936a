use super::prelude::*;

#[derive(Default)]
pub struct BookQueries;

#[Object]
impl BookQueries {
    /// Total number of books
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        catalog.book_count().await.map_err(|e| e.extend())
    }

    /// Books, optionally filtered by author name and/or genre.
    ///
    /// Both filters apply together. An unknown author name gives an empty list.
    async fn all_books(
        &self,
        ctx: &Context<'_>,
        author: Option<String>,
        genre: Option<String>,
    ) -> Result<Vec<Book>> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        let books = catalog
            .all_books(author.as_deref(), genre.as_deref())
            .await
            .map_err(|e| e.extend())?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    /// Distinct genres across all books
    async fn all_genres(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        catalog.all_genres().await.map_err(|e| e.extend())
    }
}
