use std::time::Duration;

use async_graphql::{Request as GraphqlRequest, Response as GraphqlResponse, Variables};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::graphql::{error::request_error, sdl, TIMEOUT};
use crate::server::AppContext;

pub fn graphql_routes() -> Router<AppContext> {
    Router::new()
        .route("/graphql", get(graphql_get).post(graphql_post))
        .route("/schema", get(schema))
}

async fn graphql_post(
    State(ctx): State<AppContext>,
    Json(request): Json<GraphqlRequest>,
) -> impl IntoResponse {
    Json(execute_with_timeout(&ctx, request).await)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlGetParams {
    query: String,
    operation_name: Option<String>,
    /// JSON-encoded variables object.
    variables: Option<String>,
}

async fn graphql_get(
    State(ctx): State<AppContext>,
    Query(params): Query<GraphqlGetParams>,
) -> Response {
    let mut request = GraphqlRequest::new(params.query);
    if let Some(name) = params.operation_name {
        request = request.operation_name(name);
    }

    if let Some(raw) = params.variables.as_deref().filter(|raw| !raw.is_empty()) {
        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
            Ok(variables) => {
                request = request.variables(Variables::from_json(variables.into()));
            }
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("Invalid variables: {}", e)
                    })),
                )
                    .into_response()
            }
        }
    }

    Json(execute_with_timeout(&ctx, request).await).into_response()
}

async fn schema() -> Response {
    match sdl() {
        Ok(sdl) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], sdl).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build schema");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Runs one request under the configured deadline. On expiry the execution
/// future is dropped, which cancels any provider calls still in flight.
async fn execute_with_timeout(ctx: &AppContext, request: GraphqlRequest) -> GraphqlResponse {
    let secs = ctx.config.graphql.request_timeout_secs;

    match tokio::time::timeout(Duration::from_secs(secs), ctx.graphql.execute(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_secs = secs, "GraphQL request timed out");
            GraphqlResponse::from_errors(vec![request_error(
                format!("Request timed out after {secs}s"),
                TIMEOUT,
            )])
        }
    }
}
