use super::prelude::*;

#[derive(Default)]
pub struct UserMutations;

#[Object]
impl UserMutations {
    /// Register a new user. No authentication required.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        favorite_genre: String,
    ) -> Result<User> {
        let auth = ctx.data_unchecked::<AuthService>();
        let user = auth
            .create_user(&username, &favorite_genre)
            .await
            .map_err(|e| e.extend())?;
        Ok(user.into())
    }

    /// Exchange credentials for a session token
    async fn login(&self, ctx: &Context<'_>, username: String, password: String) -> Result<Token> {
        let auth = ctx.data_unchecked::<AuthService>();
        let value = auth
            .login(&username, &password)
            .await
            .map_err(|e| e.extend())?;
        Ok(Token { value })
    }
}
