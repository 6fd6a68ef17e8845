//! Diagnostic evidence types and the evidence source contract

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::case::Alert;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Independent class of diagnostic input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceCategory {
    Metric,
    Log,
    Change,
}

impl EvidenceCategory {
    /// Every category, in pipeline order
    pub const ALL: [EvidenceCategory; 3] = [Self::Metric, Self::Log, Self::Change];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Log => "log",
            Self::Change => "change",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "metric" | "metrics" => Some(Self::Metric),
            "log" | "logs" => Some(Self::Log),
            "change" | "changes" => Some(Self::Change),
            _ => None,
        }
    }
}

impl fmt::Display for EvidenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category-specific evidence payload
///
/// `Unavailable` is the sentinel a diagnostic stage writes when its source
/// cannot be reached, so downstream stages always see a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidencePayload {
    /// Named metric readings, e.g. `cpu_usage -> "95%"`
    Metric { readings: BTreeMap<String, String> },

    /// Log lines captured around the alert
    Log { lines: Vec<String> },

    /// Recent deployments and configuration changes
    Change { events: Vec<String> },

    /// The source could not provide data
    Unavailable { reason: String },
}

impl EvidencePayload {
    pub fn metrics<K, V>(readings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Metric {
            readings: readings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn logs<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::Log {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn changes<S: Into<String>>(events: impl IntoIterator<Item = S>) -> Self {
        Self::Change {
            events: events.into_iter().map(Into::into).collect(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Whether this payload may be stored under `category`.
    /// The sentinel is valid for every category.
    pub fn fits(&self, category: EvidenceCategory) -> bool {
        matches!(
            (self, category),
            (Self::Metric { .. }, EvidenceCategory::Metric)
                | (Self::Log { .. }, EvidenceCategory::Log)
                | (Self::Change { .. }, EvidenceCategory::Change)
                | (Self::Unavailable { .. }, _)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Metric { .. } => "metric",
            Self::Log { .. } => "log",
            Self::Change { .. } => "change",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

/// A data source backing one diagnostic stage
///
/// Implementations must be idempotent and side-effect free. An `Err` is not
/// fatal: the stage substitutes [`EvidencePayload::Unavailable`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EvidenceSource: Send + Sync + fmt::Debug {
    /// The category this source owns
    fn category(&self) -> EvidenceCategory;

    /// Collect evidence for the alert
    async fn collect(&self, alert: &Alert) -> Result<EvidencePayload, DomainError>;
}

/// Run one diagnostic stage: fetch from `source`, degrade failures to the
/// sentinel. Never fails.
pub async fn gather(source: &dyn EvidenceSource, alert: &Alert) -> EvidencePayload {
    let category = source.category();

    match source.collect(alert).await {
        Ok(payload) if payload.fits(category) => payload,
        Ok(payload) => EvidencePayload::unavailable(format!(
            "{} source returned a {} payload",
            category,
            payload.kind()
        )),
        Err(e) => EvidencePayload::unavailable(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alert() -> Alert {
        Alert::new("alert-1", "High CPU Usage")
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in EvidenceCategory::ALL {
            assert_eq!(EvidenceCategory::from_str(category.as_str()), Some(category));
        }
        assert_eq!(EvidenceCategory::from_str("logs"), Some(EvidenceCategory::Log));
        assert_eq!(EvidenceCategory::from_str("traces"), None);
    }

    #[test]
    fn test_payload_serialization_is_tagged() {
        let payload = EvidencePayload::metrics([("cpu_usage", "95%")]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"kind": "metric", "readings": {"cpu_usage": "95%"}})
        );

        let sentinel = EvidencePayload::unavailable("timeout");
        let value = serde_json::to_value(&sentinel).unwrap();
        assert_eq!(value, json!({"kind": "unavailable", "reason": "timeout"}));
    }

    #[test]
    fn test_payload_fits_category() {
        assert!(EvidencePayload::logs(["x"]).fits(EvidenceCategory::Log));
        assert!(!EvidencePayload::logs(["x"]).fits(EvidenceCategory::Change));
        assert!(EvidencePayload::unavailable("down").fits(EvidenceCategory::Metric));
    }

    #[tokio::test]
    async fn test_gather_passes_payload_through() {
        let mut source = MockEvidenceSource::new();
        source.expect_category().return_const(EvidenceCategory::Log);
        source
            .expect_collect()
            .times(1)
            .returning(|_| Ok(EvidencePayload::logs(["Error: Connection timeout to DB"])));

        let payload = gather(&source, &alert()).await;
        assert_eq!(payload, EvidencePayload::logs(["Error: Connection timeout to DB"]));
    }

    #[tokio::test]
    async fn test_gather_degrades_source_error_to_sentinel() {
        let mut source = MockEvidenceSource::new();
        source.expect_category().return_const(EvidenceCategory::Metric);
        source
            .expect_collect()
            .returning(|_| Err(DomainError::provider("prometheus", "connection refused")));

        let payload = gather(&source, &alert()).await;
        match payload {
            EvidencePayload::Unavailable { reason } => {
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected sentinel, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gather_rejects_mismatched_payload() {
        let mut source = MockEvidenceSource::new();
        source.expect_category().return_const(EvidenceCategory::Change);
        source
            .expect_collect()
            .returning(|_| Ok(EvidencePayload::logs(["unexpected"])));

        let payload = gather(&source, &alert()).await;
        assert!(payload.is_unavailable());
    }
}
