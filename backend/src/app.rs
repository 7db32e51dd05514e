//! Application state and HTTP router construction.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::api;
use crate::db::Database;
use crate::graphql::{AuthUser, MeshiSchema};
use crate::services::{IdentityVerifier, authenticate};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub schema: MeshiSchema,
    /// None when no token secret is configured; every request is anonymous
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
}

/// Build the full Axum router: /graphql, health endpoints and layers.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Extract bearer token from Authorization header
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// GraphQL query/mutation handler with auth context
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "graphql_request",
        %request_id,
        user_id = tracing::field::Empty
    );

    async move {
        let mut request = req.into_inner();

        if let (Some(token), Some(verifier)) = (extract_token(&headers), state.verifier.as_deref()) {
            match authenticate(verifier, &state.db, token).await {
                Ok(Some(user)) => {
                    tracing::Span::current().record("user_id", user.id);
                    request = request.data(AuthUser::from(&user));
                }
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "Failed to resolve authenticated user"),
            }
        }

        GraphQLResponse::from(state.schema.execute(request).await)
    }
    .instrument(span)
    .await
}

/// GraphiQL interactive playground (only for browsers)
async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        axum::response::Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
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
