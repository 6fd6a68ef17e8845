//! Health check endpoints for liveness and readiness checks

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::api::types::Json;
use serde::Serialize;

use super::state::AppState;

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Simple health check - returns 200 if the service is running
/// Used for basic liveness checks
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check with dependency verification
/// Checks if the service can handle requests
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let mut checks = Vec::new();
    let mut overall_status = HealthStatus::Healthy;

    let store_check = check_case_store(&state).await;

    if store_check.status != HealthStatus::Healthy {
        overall_status = HealthStatus::Unhealthy;
    }
    checks.push(store_check);

    let latency = start.elapsed().as_millis() as u64;
    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(latency),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK, // Still accept requests
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check - simple check to verify the service is running
/// Used by Kubernetes liveness checks to detect crashes
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_case_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    match state.case_store.ping().await {
        Ok(()) => HealthCheck {
            name: "case_store".to_string(),
            status: HealthStatus::Healthy,
            message: None,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(e) => HealthCheck {
            name: "case_store".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{CaseId, CaseRecord, DomainError, Storage};

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Degraded).unwrap(),
            "\"degraded\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.0.0".to_string(),
            checks: None,
            latency_ms: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(!json.contains("checks"));
    }

    #[test]
    fn test_health_response_with_checks() {
        let response = HealthResponse {
            status: HealthStatus::Degraded,
            version: "1.0.0".to_string(),
            checks: Some(vec![
                HealthCheck {
                    name: "database".to_string(),
                    status: HealthStatus::Healthy,
                    message: None,
                    latency_ms: Some(5),
                },
                HealthCheck {
                    name: "case_store".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some("Connection refused".to_string()),
                    latency_ms: Some(100),
                },
            ]),
            latency_ms: Some(105),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("\"database\""));
        assert!(json.contains("\"case_store\""));
        assert!(json.contains("\"Connection refused\""));
    }

    #[tokio::test]
    async fn test_ready_check_reports_case_store() {
        use axum::body::to_bytes;

        let state = crate::create_app_state_with_config(&crate::config::AppConfig::default())
            .await
            .unwrap();

        let response = ready_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"][0]["name"], "case_store");
        assert!(body["checks"][0].get("message").is_none());
    }

    #[derive(Debug)]
    struct UnreachableStore;

    #[async_trait]
    impl Storage<CaseRecord> for UnreachableStore {
        async fn get(&self, _key: &CaseId) -> Result<Option<CaseRecord>, DomainError> {
            Ok(None)
        }

        async fn list(&self) -> Result<Vec<CaseRecord>, DomainError> {
            Ok(Vec::new())
        }

        async fn create(&self, entity: CaseRecord) -> Result<CaseRecord, DomainError> {
            Ok(entity)
        }

        async fn update_if_state(
            &self,
            entity: CaseRecord,
            _expected_state: &str,
        ) -> Result<CaseRecord, DomainError> {
            Ok(entity)
        }

        async fn delete_if_state(
            &self,
            _key: &CaseId,
            _allowed_states: &[&str],
        ) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn ping(&self) -> Result<(), DomainError> {
            Err(DomainError::storage("Database unreachable: connection refused"))
        }
    }

    #[tokio::test]
    async fn test_ready_check_fails_when_store_unreachable() {
        use axum::body::to_bytes;

        let mut state = crate::create_app_state_with_config(&crate::config::AppConfig::default())
            .await
            .unwrap();
        state.case_store = Arc::new(UnreachableStore);

        let response = ready_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "unhealthy");
        assert!(body["checks"][0]["message"]
            .as_str()
            .is_some_and(|m| m.contains("connection refused")));
    }
}
