//! Request identity access for GraphQL resolvers
//!
//! The HTTP and WebSocket handlers attach a [`RequestContext`] to every
//! request. Resolvers never fail on a missing identity here; the services
//! decide which operations need one.

use async_graphql::Context;

use crate::db::UserRecord;
use crate::services::RequestContext;

/// Extension trait to get the current user from GraphQL context
pub trait AuthExt {
    /// The authenticated user, if the request carried a valid token
    fn current_user(&self) -> Option<&UserRecord>;
}

impl<'a> AuthExt for Context<'a> {
    fn current_user(&self) -> Option<&UserRecord> {
        self.data_opt::<RequestContext>()
            .and_then(RequestContext::current_user)
    }
}
