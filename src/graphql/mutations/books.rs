use super::prelude::*;

#[derive(Default)]
pub struct BookMutations;

#[Object]
impl BookMutations {
    /// Add a book, creating its author if the name is new
    ///
    /// Requires authentication. Subscribers of `bookAdded` receive the result.
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        published: i32,
        genres: Vec<String>,
    ) -> Result<Book> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        let input = NewBook {
            title,
            author,
            published,
            genres,
        };

        let book = catalog
            .add_book(ctx.current_user(), input)
            .await
            .map_err(|e| e.extend())?;
        Ok(book.into())
    }
}
