use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// The current user, or null without a valid token
    async fn me(&self, ctx: &Context<'_>) -> Option<User> {
        ctx.current_user().cloned().map(User::from)
    }
}
