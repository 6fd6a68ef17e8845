//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_case_started, record_chat_query, record_decision,
    record_evidence_unavailable, record_http_request, record_remediation_failure,
    PrometheusMetrics,
};
