//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;
use crate::domain::incident::{Approval, EvidenceCategory};
use crate::domain::Intent;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});

static CASE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/v1/incidents/[^/]+").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("chatops_console_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_case_started(alert_type: &str) {
    counter!("incident_cases_started_total", "alert_type" => alert_type.to_string()).increment(1);
}

pub fn record_decision(approval: Approval) {
    counter!("incident_decisions_total", "decision" => approval.as_str()).increment(1);
}

pub fn record_evidence_unavailable(category: EvidenceCategory) {
    counter!("incident_evidence_unavailable_total", "category" => category.as_str()).increment(1);
}

pub fn record_remediation_failure() {
    counter!("incident_remediation_failures_total").increment(1);
}

pub fn record_chat_query(intent: Intent) {
    counter!("chat_queries_total", "intent" => intent.as_str()).increment(1);
}

/// Collapse per-case path segments so label cardinality stays bounded
fn sanitize_path(path: &str) -> String {
    let path = CASE_SEGMENT.replace(path, "/v1/incidents/{case_id}");
    let path = UUID_SEGMENT.replace_all(&path, "{id}");

    if path.len() > 50 {
        path[..50].to_string()
    } else {
        path.to_string()
    }
}
