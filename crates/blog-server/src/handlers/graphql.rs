//! GraphQL endpoint

use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

/// Execute one GraphQL request.
///
/// Responses carrying GraphQL errors are sent with 400 so plain HTTP clients
/// notice them; the body is still the full GraphQL response.
pub async fn execute(State(state): State<AppState>, body: Bytes) -> Response {
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "Request body is empty").into_response();
    }

    let request: async_graphql::Request = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting GraphQL payload: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON payload").into_response();
        }
    };

    let response =
        match tokio::time::timeout(state.request_timeout, state.schema.execute(request)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(
                    "GraphQL request exceeded {:?}, cancelled",
                    state.request_timeout
                );
                return (StatusCode::GATEWAY_TIMEOUT, "Request timed out").into_response();
            }
        };

    if response.is_ok() {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        warn!("GraphQL errors: {:?}", messages);
        (StatusCode::BAD_REQUEST, Json(response)).into_response()
    }
}

/// Schema SDL, for tooling and code generation
pub async fn sdl(State(state): State<AppState>) -> String {
    state.schema.sdl()
}

#[cfg(test)]
mod tests {
    use crate::graphql::build_schema;
    use crate::services::BlogService;
    use crate::storage::MemoryStore;
    use crate::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let schema = build_schema(BlogService::new(Arc::new(MemoryStore::new())));
        crate::app(AppState {
            schema,
            request_timeout: Duration::from_secs(5),
        })
    }

    async fn post(app: axum::Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::post("/query")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_successful_request() {
        let body = json!({
            "query": r#"mutation { createPost(title: "T", content: "C", authorId: "u1", allowComments: true) { id title } }"#
        });
        let (status, bytes) = post(app(), body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["data"]["createPost"]["title"], "T");
        assert_eq!(value["data"]["createPost"]["id"], "post-1");
    }

    #[tokio::test]
    async fn test_invalid_json_payload() {
        let (status, bytes) = post(app(), r#"{"query": "invalid""#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&bytes).contains("Invalid JSON payload"));
    }

    #[tokio::test]
    async fn test_graphql_errors() {
        let (status, bytes) = post(app(), json!({ "query": "{ invalidField }" }).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(!value["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_request_body() {
        let (status, bytes) = post(app(), Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&bytes).contains("Request body is empty"));
    }

    #[tokio::test]
    async fn test_health_and_sdl() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app()
            .oneshot(Request::get("/graphql/schema").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("type Post"));
    }
}
