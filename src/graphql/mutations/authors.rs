use super::prelude::*;

#[derive(Default)]
pub struct AuthorMutations;

#[Object]
impl AuthorMutations {
    /// Set an author's birth year; null when no author has that name
    ///
    /// Requires authentication.
    async fn edit_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        set_born_to: i32,
    ) -> Result<Option<Author>> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        let author = catalog
            .edit_author(ctx.current_user(), &name, set_born_to)
            .await
            .map_err(|e| e.extend())?;
        Ok(author.map(Author::from))
    }
}
