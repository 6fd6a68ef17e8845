//! Incident workflow engine contract and the fixed stage order

use std::fmt;

use async_trait::async_trait;

use super::case::{Alert, CaseId, CaseRecord, CaseState};
use super::error::IncidentError;
use super::evidence::EvidenceCategory;

/// One step of the remediation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Diagnostic stage owning one evidence category
    Collect(EvidenceCategory),
    /// Root-cause synthesis
    Synthesize,
    /// Suspension point awaiting an external decision
    ApprovalGate,
    /// Terminal remediation (or rejection) stage
    Execute,
}

/// The only topology the engine runs
pub const PIPELINE: [Stage; 6] = [
    Stage::Collect(EvidenceCategory::Metric),
    Stage::Collect(EvidenceCategory::Log),
    Stage::Collect(EvidenceCategory::Change),
    Stage::Synthesize,
    Stage::ApprovalGate,
    Stage::Execute,
];

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Collect(EvidenceCategory::Metric) => "metric_collector",
            Self::Collect(EvidenceCategory::Log) => "log_collector",
            Self::Collect(EvidenceCategory::Change) => "change_collector",
            Self::Synthesize => "root_cause_synthesizer",
            Self::ApprovalGate => "approval_gate",
            Self::Execute => "execution",
        }
    }

    /// Stages that run after a decision is accepted at the gate
    pub fn after_gate() -> &'static [Stage] {
        let gate = PIPELINE
            .iter()
            .position(|s| *s == Stage::ApprovalGate)
            .unwrap_or(PIPELINE.len() - 1);
        &PIPELINE[gate + 1..]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Orchestrates incident runs and owns the suspend/resume protocol
#[async_trait]
pub trait IncidentEngine: Send + Sync + fmt::Debug {
    /// Open a case for the alert and run it up to the approval gate.
    ///
    /// Returns the parked record, or a terminal record when the alert
    /// carried a decision.
    async fn start(&self, alert: Alert) -> Result<CaseRecord, IncidentError>;

    /// Apply an external decision to a parked case and run it to completion
    async fn resume(&self, case_id: &CaseId, approved: bool) -> Result<CaseRecord, IncidentError>;

    /// Fetch a case record
    async fn get(&self, case_id: &CaseId) -> Result<Option<CaseRecord>, IncidentError>;

    /// List case records, optionally only those in `state`
    async fn list(&self, state: Option<CaseState>) -> Result<Vec<CaseRecord>, IncidentError>;

    /// Release a parked or terminal case record. Returns false if it did not
    /// exist; a case with a run in flight is an `InvalidTransition`.
    async fn abandon(&self, case_id: &CaseId) -> Result<bool, IncidentError>;
}
