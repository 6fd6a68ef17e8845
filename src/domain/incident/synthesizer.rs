//! Root-cause synthesis over collected evidence

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::evidence::{EvidenceCategory, EvidencePayload};

/// Cause reported when nothing in the evidence points anywhere
pub const INSUFFICIENT_EVIDENCE_CAUSE: &str = "Insufficient evidence to determine root cause";

/// Action recommended when the synthesizer fails closed
pub const ESCALATION_ACTION: &str = "Escalate to manual investigation";

static LOG_ANOMALY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(errors?|exceptions?|timeouts?|timed out|fatal|panic(ked)?)\b").unwrap()
});

/// Counts that report the absence of a problem ("0 errors", "no timeouts")
static ZERO_COUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(no|0|zero)\s+(errors?|exceptions?|timeouts?)\b").unwrap()
});

static DEPLOYMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)deployment\s+#([A-Za-z0-9._-]+)").unwrap());

static CONFIG_CHANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)config(uration)?\s+change\s*[:\-]?\s*(.*)").unwrap());

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d+(\.\d+)?)").unwrap());

/// Threshold above which a named reading counts as an anomaly
#[derive(Debug)]
struct MetricRule {
    name: &'static str,
    threshold: f64,
    label: &'static str,
    action: &'static str,
}

static METRIC_RULES: [MetricRule; 4] = [
    MetricRule {
        name: "cpu_usage",
        threshold: 85.0,
        label: "CPU",
        action: "Scale out CPU capacity",
    },
    MetricRule {
        name: "memory_usage",
        threshold: 90.0,
        label: "memory",
        action: "Scale out memory capacity",
    },
    MetricRule {
        name: "latency_p99",
        threshold: 300.0,
        label: "latency",
        action: "Scale out service replicas",
    },
    MetricRule {
        name: "error_rate",
        threshold: 5.0,
        label: "error rate",
        action: "Scale out service replicas",
    },
];

/// Causal hypothesis with exactly one recommended action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub cause: String,
    pub recommended_action: String,
    /// Evidence categories the hypothesis rests on; empty when escalating
    #[serde(default)]
    pub basis: Vec<EvidenceCategory>,
}

impl Diagnosis {
    pub fn new(
        cause: impl Into<String>,
        recommended_action: impl Into<String>,
        basis: Vec<EvidenceCategory>,
    ) -> Self {
        Self {
            cause: cause.into(),
            recommended_action: recommended_action.into(),
            basis,
        }
    }

    /// The fail-closed diagnosis
    pub fn insufficient_evidence() -> Self {
        Self::new(INSUFFICIENT_EVIDENCE_CAUSE, ESCALATION_ACTION, Vec::new())
    }

    pub fn is_escalation(&self) -> bool {
        self.basis.is_empty()
    }
}

#[derive(Debug, Default)]
struct Findings<'a> {
    metric_rules: Vec<&'static MetricRule>,
    log_lines: Vec<&'a str>,
    deployment: Option<String>,
    /// Description of the config change, without its "Config change:" prefix
    config_change: Option<&'a str>,
}

/// Deterministic correlation of metric, log and change evidence.
///
/// Action precedence is change > metric > log. A change event is only
/// blamed when a metric or log anomaly corroborates it.
#[derive(Debug, Clone, Default)]
pub struct RootCauseSynthesizer;

impl RootCauseSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, evidence: &BTreeMap<EvidenceCategory, EvidencePayload>) -> Diagnosis {
        let findings = Self::findings(evidence);
        let has_metric = !findings.metric_rules.is_empty();
        let has_log = !findings.log_lines.is_empty();

        if !has_metric && !has_log {
            return Diagnosis::insufficient_evidence();
        }

        let mut basis = Vec::new();
        let mut sentences = Vec::new();

        let metric_phrase = has_metric.then(|| {
            let labels: Vec<&str> = findings.metric_rules.iter().map(|r| r.label).collect();
            format!("High {}", join_labels(&labels))
        });
        if has_metric {
            basis.push(EvidenceCategory::Metric);
        }

        let change_target = findings
            .deployment
            .as_ref()
            .map(|id| format!("Deployment #{}", id))
            .or_else(|| findings.config_change.map(|c| format!("config change '{}'", c)));

        let action = match (&change_target, &findings.deployment) {
            (Some(target), deployment) => {
                basis.push(EvidenceCategory::Change);
                sentences.push(match &metric_phrase {
                    Some(phrase) => format!("{} correlated with {}.", phrase, target),
                    None => format!("Errors began after {}.", target),
                });
                match deployment {
                    Some(id) => format!("Rollback Deployment #{}", id),
                    None => format!(
                        "Revert config change: {}",
                        findings.config_change.unwrap_or_default()
                    ),
                }
            }
            (None, _) => {
                if let Some(phrase) = &metric_phrase {
                    sentences.push(format!("{} detected.", phrase));
                }
                match findings.metric_rules.first() {
                    Some(rule) => rule.action.to_string(),
                    None => "Restart affected service".to_string(),
                }
            }
        };

        if has_log {
            basis.push(EvidenceCategory::Log);
            let extra = findings.log_lines.len() - 1;
            let first = findings.log_lines[0].trim_end_matches('.');
            if extra > 0 {
                sentences.push(format!("Logs indicate: {} (+{} more).", first, extra));
            } else {
                sentences.push(format!("Logs indicate: {}.", first));
            }
        }

        basis.sort();
        Diagnosis::new(sentences.join(" "), action, basis)
    }

    fn findings(evidence: &BTreeMap<EvidenceCategory, EvidencePayload>) -> Findings<'_> {
        let mut findings = Findings::default();

        if let Some(EvidencePayload::Metric { readings }) = evidence.get(&EvidenceCategory::Metric)
        {
            findings.metric_rules = METRIC_RULES
                .iter()
                .filter(|rule| {
                    readings
                        .get(rule.name)
                        .and_then(|v| parse_reading(v))
                        .is_some_and(|v| v >= rule.threshold)
                })
                .collect();
        }

        if let Some(EvidencePayload::Log { lines }) = evidence.get(&EvidenceCategory::Log) {
            findings.log_lines = lines
                .iter()
                .filter(|line| is_log_anomaly(line))
                .map(String::as_str)
                .collect();
        }

        if let Some(EvidencePayload::Change { events }) = evidence.get(&EvidenceCategory::Change) {
            findings.deployment = events.iter().find_map(|event| {
                DEPLOYMENT_PATTERN
                    .captures(event)
                    .map(|caps| caps[1].to_string())
            });
            findings.config_change = events.iter().find_map(|event| {
                CONFIG_CHANGE_PATTERN.captures(event).map(|caps| {
                    match caps.get(2).map(|m| m.as_str().trim()) {
                        Some(description) if !description.is_empty() => description,
                        _ => event.as_str(),
                    }
                })
            });
        }

        findings
    }
}

fn is_log_anomaly(line: &str) -> bool {
    let without_zero_counts = ZERO_COUNT_PATTERN.replace_all(line, "");
    LOG_ANOMALY_PATTERN.is_match(&without_zero_counts)
}

/// Numeric prefix of a reading such as `"95%"` or `"500ms"`
fn parse_reading(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(value)
        .and_then(|caps| caps[1].parse().ok())
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
