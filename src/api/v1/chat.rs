//! Chat routing endpoint

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRouteRequest, ChatRouteResponse, Json};

/// POST /v1/chat/route - Classify a query and gather what it needs
pub async fn route_query(
    State(state): State<AppState>,
    Json(request): Json<ChatRouteRequest>,
) -> Result<Json<ChatRouteResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query cannot be empty").with_param("query"));
    }

    let routing = state
        .chat_router
        .handle(&request.query, &request.history_text())
        .await?;

    Ok(Json(ChatRouteResponse {
        query: request.query,
        routing,
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::create_router_with_state;
    use crate::config::AppConfig;

    async fn post(body: Value) -> (StatusCode, Value) {
        let state = crate::create_app_state_with_config(&AppConfig::default())
            .await
            .unwrap();
        let app = create_router_with_state(state);

        let request = Request::builder()
            .method("POST")
            .uri("/v1/chat/route")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_knowledge_route() {
        let (status, body) = post(json!({"query": "Where is the deployment playbook?"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], "knowledge");
        assert!(body["knowledge"].as_array().is_some_and(|hits| !hits.is_empty()));
        assert!(body.get("live_data").is_none());
    }

    #[tokio::test]
    async fn test_data_route() {
        let (status, body) = post(json!({"query": "What's the trade volume right now?"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], "data");
        assert!(body["live_data"]["trade_volume"].is_u64());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (status, body) = post(json!({"query": "  "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "query");
    }
}
