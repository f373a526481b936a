//! GraphQL subscriptions for real-time updates
//!
//! Subscriptions allow clients to receive push updates over WebSocket.

use async_graphql::{Context, Subscription};
use futures::{Stream, StreamExt};

use crate::services::CatalogService;

use super::types::Book;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Every book added while the subscription is open
    async fn book_added(&self, ctx: &Context<'_>) -> impl Stream<Item = Book> {
        let catalog = ctx.data_unchecked::<CatalogService>();
        catalog.subscribe_book_added().map(Book::from)
    }
}
