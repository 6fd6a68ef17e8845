//! Approval gate - the suspend/resume point of an incident run

use serde::{Deserialize, Serialize};

use super::case::{Approval, CaseId, CaseRecord, CaseState};
use super::error::IncidentError;

/// State of the gate itself. `Approved` and `Rejected` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateState {
    Pending,
    Approved,
    Rejected,
}

impl GateState {
    /// Gate state of a record, `None` before the record reaches the gate
    pub fn of(record: &CaseRecord) -> Option<Self> {
        match (record.state(), record.approval()) {
            (CaseState::Diagnosing, _) => None,
            (CaseState::Pending, _) => Some(Self::Pending),
            (_, Some(Approval::Approved)) => Some(Self::Approved),
            (_, Some(Approval::Rejected)) => Some(Self::Rejected),
            (_, None) => None,
        }
    }
}

/// External decision on a parked run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub case_id: CaseId,
    pub approved: bool,
}

impl Decision {
    pub fn new(case_id: CaseId, approved: bool) -> Self {
        Self { case_id, approved }
    }

    pub fn approval(&self) -> Approval {
        Approval::from_bool(self.approved)
    }
}

/// Apply a decision to a parked record.
///
/// Transitions the gate exactly once. Any record not parked at the gate is
/// left untouched and an `InvalidTransition` is returned.
pub fn submit(record: &mut CaseRecord, decision: &Decision) -> Result<GateState, IncidentError> {
    if record.case_id() != &decision.case_id {
        return Err(IncidentError::invalid_transition(
            record.case_id().as_str(),
            record.state().as_str(),
            format!("accept a decision addressed to '{}'", decision.case_id),
        ));
    }

    record.record_approval(decision.approval())?;

    Ok(if decision.approved {
        GateState::Approved
    } else {
        GateState::Rejected
    })
}
