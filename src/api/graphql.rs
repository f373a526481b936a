//! GraphQL HTTP and WebSocket handlers
//!
//! Both transports run the request context builder: HTTP from the
//! `Authorization` header, WebSocket from the upgrade request header or the
//! `connection_init` payload.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::app::AppState;
use crate::services::bearer_from_connection_params;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws_handler))
}

/// GraphiQL interactive playground (only for browsers)
async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        axum::response::Html(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql/ws")
                .finish(),
        )
        .into_response()
    } else {
        (
            axum::http::StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

/// GraphQL query/mutation handler with auth context
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let context = state.context_builder.from_headers(&headers).await;
    let request = req.into_inner().data(context);
    state.schema.execute(request).await.into()
}

/// GraphQL WebSocket handler for subscriptions with auth
async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let header_context = state.context_builder.from_headers(&headers).await;
    let builder = state.context_builder.clone();

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            GraphQLWebSocket::new(socket, state.schema.clone(), protocol)
                .on_connection_init(move |params| {
                    let builder = builder.clone();
                    let header_context = header_context.clone();
                    async move {
                        // A token in the init payload wins over the upgrade header
                        let context = match bearer_from_connection_params(&params) {
                            Some(token) => builder.build(Some(&token)).await,
                            None => header_context,
                        };
                        let mut data = async_graphql::Data::default();
                        data.insert(context);
                        Ok(data)
                    }
                })
                .serve()
        })
}
