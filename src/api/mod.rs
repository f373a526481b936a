//! HTTP route definitions
//!
//! The primary API is GraphQL at /graphql (queries, mutations) and
//! /graphql/ws (subscriptions). Health probes live alongside it.

pub mod graphql;
pub mod health;
