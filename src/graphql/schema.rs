//! GraphQL schema definition with queries, mutations, and subscriptions
//!
//! Reads and `createUser`/`login` are open to everyone; `addBook` and
//! `editAuthor` require a valid bearer token.

use async_graphql::dataloader::DataLoader;
use async_graphql::extensions::Tracing;
use async_graphql::{MergedObject, Schema};

use crate::db::Database;
use crate::services::{AuthService, CatalogService};

use super::loaders::BookCountLoader;
use super::mutations::{AuthorMutations, BookMutations, UserMutations};
use super::queries::{AuthorQueries, BookQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type
pub type CatalogSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(BookQueries, AuthorQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(BookMutations, AuthorMutations, UserMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(catalog: CatalogService, auth: AuthService, db: Database) -> CatalogSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), SubscriptionRoot)
        .data(catalog)
        .data(auth)
        .data(DataLoader::new(BookCountLoader::new(db), tokio::spawn))
        .extension(Tracing)
        .finish()
}
