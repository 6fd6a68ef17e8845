//! Incident remediation domain
//!
//! An incident run threads a [`CaseRecord`] through a fixed pipeline:
//!
//! metric -> log -> change -> synthesize -> approval gate -> execute
//!
//! The approval gate is a suspension point. The engine checkpoints the record
//! in state `pending` and hands it back to the caller; a later decision
//! (possibly from another process) resumes the run at the execution stage.

mod case;
mod engine;
mod error;
mod evidence;
pub mod execution;
pub mod gate;
mod synthesizer;

pub use case::{Alert, Approval, CaseId, CaseRecord, CaseState, MAX_CASE_ID_LENGTH};
pub use engine::{IncidentEngine, Stage, PIPELINE};
pub use error::IncidentError;
pub use evidence::{gather, EvidenceCategory, EvidencePayload, EvidenceSource};
pub use execution::{ExecutionReport, RemediationEffect, ESCALATION_OUTCOME, REJECTION_OUTCOME};
pub use gate::{Decision, GateState};
pub use synthesizer::{
    Diagnosis, RootCauseSynthesizer, ESCALATION_ACTION, INSUFFICIENT_EVIDENCE_CAUSE,
};

#[cfg(test)]
pub use evidence::MockEvidenceSource;
#[cfg(test)]
pub use execution::MockRemediationEffect;
