//! Integration tests for the catalog GraphQL API
//!
//! These tests drive the assembled schema against an in-memory database:
//! - Anonymous writes are rejected and leave the store untouched
//! - Authors are found or created when books are added
//! - Book filters and derived book counts
//! - Login, token-derived identity and `me`
//! - `bookAdded` delivery to open subscriptions
//! - Health probes on the HTTP router

use std::time::Duration;

use async_graphql::{Request, Response, Value};
use serde_json::{Value as Json, json};

use library_backend::config::Config;
use library_backend::db::Database;
use library_backend::AppState;
use library_backend::services::RequestContext;

// ============================================================================
// Harness
// ============================================================================

fn test_config() -> Config {
    Config {
        host: None,
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: "integration-test-secret".to_string(),
        token_lifetime_secs: 3600,
        login_shared_secret: "secret".to_string(),
        notifier_queue_capacity: 16,
    }
}

async fn test_state() -> AppState {
    let db = Database::connect_in_memory().await.unwrap();
    db.migrate().await.unwrap();
    AppState::new(&test_config(), db)
}

async fn execute(state: &AppState, ctx: RequestContext, query: &str) -> Response {
    state.schema.execute(Request::new(query).data(ctx)).await
}

/// Run `query` and return its data, failing on any GraphQL error
async fn data(state: &AppState, ctx: RequestContext, query: &str) -> Json {
    let response = execute(state, ctx, query).await;
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

fn error_code(response: &Response) -> Option<String> {
    let error = response.errors.first()?;
    match error.extensions.as_ref()?.get("code")? {
        Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

/// Create `username`, log in with the shared secret and return its request context
async fn signed_in(state: &AppState, username: &str) -> RequestContext {
    let create = format!(
        r#"mutation {{ createUser(username: "{username}", favoriteGenre: "sci-fi") {{ id }} }}"#
    );
    data(state, RequestContext::anonymous(), &create).await;

    let login = data(
        state,
        RequestContext::anonymous(),
        &format!(r#"mutation {{ login(username: "{username}", password: "secret") {{ value }} }}"#),
    )
    .await;
    let token = login["login"]["value"].as_str().unwrap().to_string();

    state.context_builder.build(Some(&token)).await
}

fn add_book_mutation(title: &str, author: &str, published: i32, genres: &[&str]) -> String {
    let genres = genres
        .iter()
        .map(|g| format!("\"{g}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"mutation {{
            addBook(
                title: "{title}", author: "{author}",
                published: {published}, genres: [{genres}]
            ) {{
                title
                author {{ name }}
            }}
        }}"#
    )
}

// ============================================================================
// Authorization
// ============================================================================

mod authorization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_anonymous_add_book_is_rejected() {
        let state = test_state().await;

        let response = execute(
            &state,
            RequestContext::anonymous(),
            &add_book_mutation("Dune", "Herbert", 1965, &["sci-fi"]),
        )
        .await;

        assert_eq!(error_code(&response).as_deref(), Some("UNAUTHENTICATED"));
        let counts = data(
            &state,
            RequestContext::anonymous(),
            "{ bookCount authorCount }",
        )
        .await;
        assert_eq!(counts, json!({ "bookCount": 0, "authorCount": 0 }));
    }

    #[tokio::test]
    async fn test_anonymous_edit_author_leaves_born_unchanged() {
        let state = test_state().await;
        let alice = signed_in(&state, "alice").await;
        data(&state, alice, &add_book_mutation("Dune", "Herbert", 1965, &["sci-fi"])).await;

        let response = execute(
            &state,
            RequestContext::anonymous(),
            r#"mutation { editAuthor(name: "Herbert", setBornTo: 1920) { born } }"#,
        )
        .await;
        assert_eq!(error_code(&response).as_deref(), Some("UNAUTHENTICATED"));

        let authors = data(
            &state,
            RequestContext::anonymous(),
            "{ allAuthors { name born } }",
        )
        .await;
        assert_eq!(authors, json!({ "allAuthors": [{ "name": "Herbert", "born": null }] }));
    }

    #[tokio::test]
    async fn test_invalid_token_means_anonymous() {
        let state = test_state().await;
        let ctx = state.context_builder.build(Some("not-a-token")).await;
        assert!(ctx.current_user().is_none());

        let me = data(&state, ctx, "{ me { username } }").await;
        assert_eq!(me, json!({ "me": null }));
    }
}

// ============================================================================
// Users and login
// ============================================================================

mod users {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_login_token_resolves_me() {
        let state = test_state().await;
        let alice = signed_in(&state, "alice").await;

        let me = data(&state, alice, "{ me { username favoriteGenre } }").await;
        assert_eq!(me, json!({ "me": { "username": "alice", "favoriteGenre": "sci-fi" } }));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let state = test_state().await;
        signed_in(&state, "alice").await;

        let response = execute(
            &state,
            RequestContext::anonymous(),
            r#"mutation { login(username: "alice", password: "hunter2") { value } }"#,
        )
        .await;
        assert_eq!(error_code(&response).as_deref(), Some("WRONG_CREDENTIALS"));
    }

    #[tokio::test]
    async fn test_login_with_unknown_user() {
        let state = test_state().await;

        let response = execute(
            &state,
            RequestContext::anonymous(),
            r#"mutation { login(username: "nobody", password: "secret") { value } }"#,
        )
        .await;
        assert_eq!(error_code(&response).as_deref(), Some("WRONG_CREDENTIALS"));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_bad_input() {
        let state = test_state().await;
        signed_in(&state, "alice").await;

        let response = execute(
            &state,
            RequestContext::anonymous(),
            r#"mutation { createUser(username: "alice", favoriteGenre: "crime") { id } }"#,
        )
        .await;
        assert_eq!(error_code(&response).as_deref(), Some("BAD_USER_INPUT"));

        let extensions = response.errors[0].extensions.as_ref().unwrap();
        assert_eq!(
            extensions.get("invalidArgs"),
            Some(&Value::String("alice".to_string()))
        );
    }
}

// ============================================================================
// Books and authors
// ============================================================================

mod catalog {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn seeded() -> AppState {
        let state = test_state().await;
        let alice = signed_in(&state, "alice").await;
        for (title, author, published, genres) in [
            ("Dune", "Herbert", 1965, &["sci-fi"][..]),
            ("Emma", "Austen", 1815, &["classic", "romance"][..]),
            ("Persuasion", "Austen", 1817, &["classic"][..]),
            ("Dune Messiah", "Herbert", 1969, &["sci-fi"][..]),
        ] {
            data(
                &state,
                alice.clone(),
                &add_book_mutation(title, author, published, genres),
            )
            .await;
        }
        state
    }

    #[tokio::test]
    async fn test_known_author_is_reused() {
        let state = seeded().await;

        let counts = data(
            &state,
            RequestContext::anonymous(),
            "{ bookCount authorCount }",
        )
        .await;
        assert_eq!(counts, json!({ "bookCount": 4, "authorCount": 2 }));
    }

    #[tokio::test]
    async fn test_book_counts_are_derived_per_author() {
        let state = seeded().await;

        let authors = data(
            &state,
            RequestContext::anonymous(),
            "{ allAuthors { name bookCount } }",
        )
        .await;
        assert_eq!(
            authors,
            json!({
                "allAuthors": [
                    { "name": "Herbert", "bookCount": 2 },
                    { "name": "Austen", "bookCount": 2 },
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_author_without_books_counts_zero() {
        let state = test_state().await;
        state.db.authors().find_or_create("Idle").await.unwrap();

        let authors = data(
            &state,
            RequestContext::anonymous(),
            "{ allAuthors { name bookCount } }",
        )
        .await;
        assert_eq!(
            authors,
            json!({ "allAuthors": [{ "name": "Idle", "bookCount": 0 }] })
        );
    }

    #[tokio::test]
    async fn test_all_books_filters_combine() {
        let state = seeded().await;

        let titles = |json: Json| -> Vec<String> {
            json["allBooks"]
                .as_array()
                .unwrap()
                .iter()
                .map(|b| b["title"].as_str().unwrap().to_string())
                .collect()
        };
        let anon = RequestContext::anonymous;

        let all = data(&state, anon(), "{ allBooks { title } }").await;
        assert_eq!(titles(all), ["Dune", "Emma", "Persuasion", "Dune Messiah"]);

        let by_author = data(&state, anon(), r#"{ allBooks(author: "Austen") { title } }"#).await;
        assert_eq!(titles(by_author), ["Emma", "Persuasion"]);

        let by_genre = data(&state, anon(), r#"{ allBooks(genre: "sci-fi") { title } }"#).await;
        assert_eq!(titles(by_genre), ["Dune", "Dune Messiah"]);

        let both = data(
            &state,
            anon(),
            r#"{ allBooks(author: "Austen", genre: "romance") { title } }"#,
        )
        .await;
        assert_eq!(titles(both), ["Emma"]);

        let unknown = data(&state, anon(), r#"{ allBooks(author: "Tolkien") { title } }"#).await;
        assert!(titles(unknown).is_empty());
    }

    #[tokio::test]
    async fn test_all_genres_are_distinct() {
        let state = seeded().await;

        let genres = data(&state, RequestContext::anonymous(), "{ allGenres }").await;
        assert_eq!(genres, json!({ "allGenres": ["sci-fi", "classic", "romance"] }));
    }

    #[tokio::test]
    async fn test_edit_unknown_author_returns_null() {
        let state = seeded().await;
        let bob = signed_in(&state, "bob").await;
        let edited = data(
            &state,
            bob,
            r#"mutation { editAuthor(name: "Tolkien", setBornTo: 1892) { name } }"#,
        )
        .await;
        assert_eq!(edited, json!({ "editAuthor": null }));
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

mod subscriptions {
    use super::*;
    use pretty_assertions::assert_eq;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_book_added_is_pushed_to_open_subscription() {
        let state = test_state().await;
        let alice = signed_in(&state, "alice").await;

        let schema = state.schema.clone();
        let listener = tokio::spawn(async move {
            let mut stream = Box::pin(schema.execute_stream(
                Request::new("subscription { bookAdded { title author { name } } }")
                    .data(RequestContext::anonymous()),
            ));
            stream.next().await
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while state.catalog.book_added_subscribers() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscription never registered");

        data(&state, alice, &add_book_mutation("Dune", "Herbert", 1965, &["sci-fi"])).await;

        let event = tokio::time::timeout(Duration::from_secs(5), listener)
            .await
            .expect("no event delivered")
            .unwrap()
            .expect("stream ended");
        assert!(event.errors.is_empty(), "unexpected errors: {:?}", event.errors);
        assert_eq!(
            event.data.into_json().unwrap(),
            json!({ "bookAdded": { "title": "Dune", "author": { "name": "Herbert" } } })
        );
    }

    #[tokio::test]
    async fn test_rejected_add_publishes_nothing() {
        let state = test_state().await;
        let mut stream = state.catalog.subscribe_book_added();

        execute(
            &state,
            RequestContext::anonymous(),
            &add_book_mutation("Dune", "Herbert", 1965, &["sci-fi"]),
        )
        .await;

        let next = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
        assert!(next.is_err(), "rejected mutation must not notify");
    }
}

// ============================================================================
// Full session walkthrough
// ============================================================================

#[tokio::test]
async fn test_alice_adds_and_dates_dune() {
    let state = test_state().await;

    let created = data(
        &state,
        RequestContext::anonymous(),
        r#"mutation {
            createUser(username: "alice", favoriteGenre: "sci-fi") { username favoriteGenre }
        }"#,
    )
    .await;
    pretty_assertions::assert_eq!(
        created,
        json!({ "createUser": { "username": "alice", "favoriteGenre": "sci-fi" } })
    );

    let login = data(
        &state,
        RequestContext::anonymous(),
        r#"mutation { login(username: "alice", password: "secret") { value } }"#,
    )
    .await;
    let token = login["login"]["value"].as_str().unwrap().to_string();
    let alice = state.context_builder.build(Some(&token)).await;

    let added = data(
        &state,
        alice.clone(),
        &add_book_mutation("Dune", "Herbert", 1965, &["sci-fi"]),
    )
    .await;
    pretty_assertions::assert_eq!(
        added,
        json!({ "addBook": { "title": "Dune", "author": { "name": "Herbert" } } })
    );

    let edited = data(
        &state,
        alice,
        r#"mutation { editAuthor(name: "Herbert", setBornTo: 1920) { name born bookCount } }"#,
    )
    .await;
    pretty_assertions::assert_eq!(
        edited,
        json!({ "editAuthor": { "name": "Herbert", "born": 1920, "bookCount": 1 } })
    );

    let books = data(
        &state,
        RequestContext::anonymous(),
        r#"{ allBooks(author: "Herbert") { title published genres author { born } } }"#,
    )
    .await;
    pretty_assertions::assert_eq!(
        books,
        json!({
            "allBooks": [{
                "title": "Dune",
                "published": 1965,
                "genres": ["sci-fi"],
                "author": { "born": 1920 }
            }]
        })
    );
}

// ============================================================================
// HTTP surface
// ============================================================================

mod http {
    use super::*;
    use pretty_assertions::assert_eq;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use tower::ServiceExt;

    use library_backend::build_app;

    #[tokio::test]
    async fn test_healthz() {
        let app = build_app(test_state().await);

        let response = app
            .oneshot(HttpRequest::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Json = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readyz_reports_database() {
        let app = build_app(test_state().await);

        let response = app
            .oneshot(HttpRequest::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Json = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ready"], true);
        assert_eq!(json["book_added_subscribers"], 0);
    }

    #[tokio::test]
    async fn test_graphql_post_uses_bearer_header() {
        let state = test_state().await;
        let login = {
            signed_in(&state, "alice").await;
            data(
                &state,
                RequestContext::anonymous(),
                r#"mutation { login(username: "alice", password: "secret") { value } }"#,
            )
            .await
        };
        let token = login["login"]["value"].as_str().unwrap().to_string();
        let app = build_app(state);

        let request = HttpRequest::post("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(
                json!({ "query": "{ me { username } }" }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Json = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["me"]["username"], "alice");
    }
}
