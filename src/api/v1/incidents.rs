//! Incident workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, CaseListResponse, CaseQueryParams, CaseResponse, DecisionRequest, Json,
    StartIncidentRequest,
};
use crate::domain::{Alert, CaseId, CaseState, DomainError, IncidentError};

/// Path ids are validated like alert ids but reported as a malformed id
fn parse_case_id(case_id: String) -> Result<CaseId, ApiError> {
    CaseId::new(case_id).map_err(|e| match e {
        IncidentError::InvalidAlert(message) => ApiError::from(DomainError::invalid_id(message)),
        other => ApiError::from(other),
    })
}

/// POST /v1/incidents - Open a case and run it to the approval gate
pub async fn start_incident(
    State(state): State<AppState>,
    Json(request): Json<StartIncidentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let alert = Alert::from(request);
    let record = state.incident_engine.start(alert).await?;

    info!(case_id = %record.case_id(), state = %record.state(), "Incident started via API");

    Ok((StatusCode::CREATED, Json(CaseResponse::from(record))))
}

/// GET /v1/incidents - List cases, optionally by `?state=`
pub async fn list_incidents(
    State(state): State<AppState>,
    Query(params): Query<CaseQueryParams>,
) -> Result<Json<CaseListResponse>, ApiError> {
    let filter = match params.state.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(CaseState::from_str(raw).ok_or_else(|| {
            ApiError::bad_request(format!("Unknown case state '{}'", raw)).with_param("state")
        })?),
    };

    let records = state.incident_engine.list(filter).await?;

    Ok(Json(CaseListResponse::new(records)))
}

/// GET /v1/incidents/{case_id}
pub async fn get_incident(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseResponse>, ApiError> {
    let case_id = parse_case_id(case_id)?;

    match state.incident_engine.get(&case_id).await? {
        Some(record) => Ok(Json(CaseResponse::from(record))),
        None => Err(ApiError::not_found(format!("Case '{}' not found", case_id))
            .with_code("unknown_case")),
    }
}

/// POST /v1/incidents/{case_id}/decision - Resume a parked case
pub async fn submit_decision(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<CaseResponse>, ApiError> {
    let case_id = parse_case_id(case_id)?;
    let record = state
        .incident_engine
        .resume(&case_id, request.approved)
        .await?;

    Ok(Json(CaseResponse::from(record)))
}

/// DELETE /v1/incidents/{case_id} - Release a case record
pub async fn abandon_incident(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let case_id = parse_case_id(case_id)?;

    if state.incident_engine.abandon(&case_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Case '{}' not found", case_id)).with_code("unknown_case"))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::create_router_with_state;
    use crate::config::AppConfig;

    async fn app() -> Router {
        let state = crate::create_app_state_with_config(&AppConfig::default())
            .await
            .unwrap();
        create_router_with_state(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    fn high_cpu(id: &str) -> Value {
        json!({
            "alert_id": id,
            "alert_type": "High CPU Usage",
            "alert_details": {"host": "risk-01"},
        })
    }

    #[tokio::test]
    async fn test_start_then_approve() {
        let app = app().await;

        let (status, body) =
            send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["case_id"], "inc-1");
        assert_eq!(body["state"], "pending");
        assert_eq!(body["gate"], "PENDING");
        assert_eq!(body["diagnosis"]["recommended_action"], "Rollback Deployment #1234");
        assert!(body["outcome"].is_null());

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/incidents/inc-1/decision",
            Some(json!({"approved": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "approved");
        assert_eq!(
            body["outcome"],
            "Rollback Deployment #1234 executed successfully. System recovering."
        );
    }

    #[tokio::test]
    async fn test_second_decision_conflicts() {
        let app = app().await;
        send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;
        send(
            &app,
            Method::POST,
            "/v1/incidents/inc-1/decision",
            Some(json!({"approved": false})),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/incidents/inc-1/decision",
            Some(json!({"approved": true})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "invalid_transition");

        let (_, body) = send(&app, Method::GET, "/v1/incidents/inc-1", None).await;
        assert_eq!(body["state"], "rejected");
        assert_eq!(body["approval"], "rejected");
    }

    #[tokio::test]
    async fn test_duplicate_start_conflicts() {
        let app = app().await;
        send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;

        let (status, body) =
            send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "duplicate_case");
    }

    #[tokio::test]
    async fn test_decision_for_unknown_case() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/incidents/ghost/decision",
            Some(json!({"approved": true})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_invalid_alert_is_bad_request() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/incidents",
            Some(json!({"alert_id": "inc-1", "alert_type": ""})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_alert");
    }

    #[tokio::test]
    async fn test_malformed_decision_body() {
        let app = app().await;
        send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/incidents/inc-1/decision",
            Some(json!({"approved": "maybe"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");

        let (_, body) = send(&app, Method::GET, "/v1/incidents/inc-1", None).await;
        assert_eq!(body["state"], "pending");
    }

    #[tokio::test]
    async fn test_list_by_state() {
        let app = app().await;
        send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;
        send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-2"))).await;
        send(
            &app,
            Method::POST,
            "/v1/incidents/inc-2/decision",
            Some(json!({"approved": true})),
        )
        .await;

        let (status, body) = send(&app, Method::GET, "/v1/incidents?state=pending", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["case_id"], "inc-1");

        let (_, body) = send(&app, Method::GET, "/v1/incidents", None).await;
        assert_eq!(body["total"], 2);

        let (status, body) = send(&app, Method::GET, "/v1/incidents?state=paused", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "state");
    }

    #[tokio::test]
    async fn test_malformed_case_id_in_path() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/v1/incidents/bad%20id", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["param"], "case_id");
        assert!(body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("bad id")));
    }

    #[tokio::test]
    async fn test_abandon() {
        let app = app().await;
        send(&app, Method::POST, "/v1/incidents", Some(high_cpu("inc-1"))).await;

        let (status, _) = send(&app, Method::DELETE, "/v1/incidents/inc-1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, "/v1/incidents/inc-1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/v1/incidents/inc-1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
