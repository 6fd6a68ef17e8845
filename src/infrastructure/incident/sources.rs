//! Simulated evidence sources
//!
//! Stand-ins for the monitoring, log and change-management integrations.
//! Each source honours per-alert overrides in `alert_details`:
//!
//! - `metrics`: object of reading name to value
//! - `logs`: array of log lines
//! - `changes`: array of change events
//! - `unavailable`: array of category names whose source should fail
//!
//! Without overrides, the `High CPU Usage` alert produces a fixed scenario
//! and every other alert type gets randomised readings.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use crate::domain::incident::{Alert, EvidenceCategory, EvidencePayload, EvidenceSource};
use crate::domain::DomainError;

/// Alert type with a fixed, reproducible evidence scenario
pub const HIGH_CPU_ALERT: &str = "High CPU Usage";

const LOG_POOL: &[&str] = &[
    "Error: Connection timeout to DB",
    "Warning: High latency detected in API Gateway",
    "Info: Health check passed for OrderMatching",
    "Exception: NullPointerException in RiskEngine",
    "Info: Cache hit ratio 97%",
];

const CHANGE_POOL: &[&str] = &[
    "Deployment #1187: Update Gateway (2 hours ago)",
    "Config Change: Reduced order book depth",
    "Deployment #1302: Patch OrderMatching (45 mins ago)",
];

/// Evidence source backed by canned or randomised data
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    category: EvidenceCategory,
}

impl SimulatedSource {
    pub fn new(category: EvidenceCategory) -> Self {
        Self { category }
    }

    pub fn metric() -> Self {
        Self::new(EvidenceCategory::Metric)
    }

    pub fn log() -> Self {
        Self::new(EvidenceCategory::Log)
    }

    pub fn change() -> Self {
        Self::new(EvidenceCategory::Change)
    }

    /// One source per category, in pipeline order
    pub fn all() -> Vec<Arc<dyn EvidenceSource>> {
        EvidenceCategory::ALL
            .into_iter()
            .map(|c| Arc::new(Self::new(c)) as Arc<dyn EvidenceSource>)
            .collect()
    }

    fn provider_name(&self) -> String {
        format!("simulated-{}", self.category)
    }

    fn forced_unavailable(&self, alert: &Alert) -> bool {
        alert
            .detail("unavailable")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(EvidenceCategory::from_str)
                    .any(|c| c == self.category)
            })
            .unwrap_or(false)
    }

    fn from_override(&self, alert: &Alert) -> Result<Option<EvidencePayload>, DomainError> {
        let key = match self.category {
            EvidenceCategory::Metric => "metrics",
            EvidenceCategory::Log => "logs",
            EvidenceCategory::Change => "changes",
        };

        let Some(value) = alert.detail(key) else {
            return Ok(None);
        };

        let malformed = || {
            DomainError::provider(
                self.provider_name(),
                format!("alert_details.{} has an unexpected shape", key),
            )
        };

        let payload = match self.category {
            EvidenceCategory::Metric => {
                let readings = value.as_object().ok_or_else(malformed)?;
                EvidencePayload::metrics(readings.iter().map(|(name, v)| {
                    let reading = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (name.clone(), reading)
                }))
            }
            EvidenceCategory::Log => {
                EvidencePayload::logs(string_list(value).ok_or_else(malformed)?)
            }
            EvidenceCategory::Change => {
                EvidencePayload::changes(string_list(value).ok_or_else(malformed)?)
            }
        };

        Ok(Some(payload))
    }

    fn scenario(&self) -> EvidencePayload {
        match self.category {
            EvidenceCategory::Metric => EvidencePayload::metrics([
                ("cpu_usage", "95%"),
                ("memory_usage", "80%"),
                ("latency_p99", "500ms"),
            ]),
            EvidenceCategory::Log => EvidencePayload::logs([
                "Error: Connection timeout to DB",
                "Warning: High latency detected in API Gateway",
            ]),
            EvidenceCategory::Change => EvidencePayload::changes([
                "Deployment #1234: Update RiskEngine (20 mins ago)",
                "Config Change: Increased connection pool size",
            ]),
        }
    }

    fn randomised(&self) -> EvidencePayload {
        let mut rng = rand::thread_rng();

        match self.category {
            EvidenceCategory::Metric => {
                let mut readings = BTreeMap::new();
                readings.insert("cpu_usage", format!("{}%", rng.gen_range(20..100)));
                readings.insert("memory_usage", format!("{}%", rng.gen_range(30..100)));
                readings.insert("latency_p99", format!("{}ms", rng.gen_range(50..800)));
                EvidencePayload::metrics(readings)
            }
            EvidenceCategory::Log => {
                let count = rng.gen_range(1..=3);
                EvidencePayload::logs(
                    LOG_POOL
                        .choose_multiple(&mut rng, count)
                        .map(|line| line.to_string()),
                )
            }
            EvidenceCategory::Change => {
                let count = rng.gen_range(0..=2);
                EvidencePayload::changes(
                    CHANGE_POOL
                        .choose_multiple(&mut rng, count)
                        .map(|event| event.to_string()),
                )
            }
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[async_trait]
impl EvidenceSource for SimulatedSource {
    fn category(&self) -> EvidenceCategory {
        self.category
    }

    async fn collect(&self, alert: &Alert) -> Result<EvidencePayload, DomainError> {
        if self.forced_unavailable(alert) {
            return Err(DomainError::provider(
                self.provider_name(),
                "source unreachable",
            ));
        }

        if let Some(payload) = self.from_override(alert)? {
            debug!(
                category = %self.category,
                alert_id = %alert.alert_id,
                "Using evidence override"
            );
            return Ok(payload);
        }

        if alert.alert_type.eq_ignore_ascii_case(HIGH_CPU_ALERT) {
            return Ok(self.scenario());
        }

        Ok(self.randomised())
    }
}
