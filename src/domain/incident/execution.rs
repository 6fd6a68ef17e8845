//! Execution stage - applies the approved remediation

use std::fmt;

use async_trait::async_trait;

use super::case::{Approval, CaseId, CaseRecord};
use super::error::IncidentError;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Outcome written when the operator rejects the recommended action
pub const REJECTION_OUTCOME: &str = "Action rejected. Escalating to manual investigation.";

/// Outcome written when an escalation diagnosis is approved; nothing is applied
pub const ESCALATION_OUTCOME: &str =
    "No automated remediation available. Escalated to manual investigation.";

/// The operational side effect behind a recommended action (rollback,
/// scale-out, restart, ...)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemediationEffect: Send + Sync + fmt::Debug {
    /// Apply `action` for the case. The returned text is informational.
    async fn apply(&self, case_id: &CaseId, action: &str) -> Result<String, DomainError>;
}

/// What the execution stage did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionReport {
    Applied,
    Failed(String),
    Skipped,
    Escalated,
}

pub fn success_outcome(action: &str) -> String {
    format!("{} executed successfully. System recovering.", action)
}

pub fn failure_outcome(action: &str, error: &str) -> String {
    format!(
        "{} failed: {}. Escalate to manual investigation.",
        action, error
    )
}

/// Run the execution stage on a record whose decision has been claimed.
///
/// An effect failure is recorded in the outcome; only record-level
/// violations surface as errors.
pub async fn execute(
    record: &mut CaseRecord,
    effect: &dyn RemediationEffect,
) -> Result<ExecutionReport, IncidentError> {
    let approval = record.approval().ok_or_else(|| {
        IncidentError::missing_prerequisite(
            record.case_id().as_str(),
            "outcome",
            "an approval decision",
        )
    })?;

    if approval == Approval::Rejected {
        record.record_outcome(REJECTION_OUTCOME)?;
        return Ok(ExecutionReport::Skipped);
    }

    let diagnosis = record.diagnosis().ok_or_else(|| {
        IncidentError::missing_prerequisite(record.case_id().as_str(), "outcome", "a diagnosis")
    })?;

    if diagnosis.is_escalation() {
        record.record_outcome(ESCALATION_OUTCOME)?;
        return Ok(ExecutionReport::Escalated);
    }

    let action = diagnosis.recommended_action.clone();

    match effect.apply(record.case_id(), &action).await {
        Ok(_) => {
            record.record_outcome(success_outcome(&action))?;
            Ok(ExecutionReport::Applied)
        }
        Err(e) => {
            let message = e.to_string();
            record.record_outcome(failure_outcome(&action, &message))?;
            Ok(ExecutionReport::Failed(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::incident::{
        Alert, CaseState, Diagnosis, EvidenceCategory, EvidencePayload,
    };

    fn claimed(approval: Approval) -> CaseRecord {
        let mut record = CaseRecord::open(&Alert::new("inc-1", "High CPU Usage")).unwrap();
        for category in EvidenceCategory::ALL {
            record
                .record_evidence(category, EvidencePayload::unavailable("n/a"))
                .unwrap();
        }
        record
            .record_diagnosis(Diagnosis::new(
                "High CPU correlated with Deployment #1234.",
                "Rollback Deployment #1234",
                vec![EvidenceCategory::Metric, EvidenceCategory::Change],
            ))
            .unwrap();
        record.record_approval(approval).unwrap();
        record
    }

    #[tokio::test]
    async fn test_approved_action_is_applied() {
        let mut effect = MockRemediationEffect::new();
        effect
            .expect_apply()
            .withf(|case_id, action| {
                case_id.as_str() == "inc-1" && action == "Rollback Deployment #1234"
            })
            .times(1)
            .returning(|_, _| Ok("rollback started".to_string()));

        let mut record = claimed(Approval::Approved);
        let report = execute(&mut record, &effect).await.unwrap();

        assert_eq!(report, ExecutionReport::Applied);
        assert_eq!(
            record.outcome(),
            Some("Rollback Deployment #1234 executed successfully. System recovering.")
        );
        assert_eq!(record.state(), CaseState::Approved);
    }

    #[tokio::test]
    async fn test_effect_failure_is_data() {
        let mut effect = MockRemediationEffect::new();
        effect
            .expect_apply()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("deployer", "API timeout")));

        let mut record = claimed(Approval::Approved);
        let report = execute(&mut record, &effect).await.unwrap();

        assert!(matches!(report, ExecutionReport::Failed(_)));
        let outcome = record.outcome().unwrap();
        assert!(outcome.starts_with("Rollback Deployment #1234 failed:"));
        assert!(outcome.contains("API timeout"));
        assert_eq!(record.state(), CaseState::Approved);
    }

    #[tokio::test]
    async fn test_rejection_never_invokes_effect() {
        let mut effect = MockRemediationEffect::new();
        effect.expect_apply().times(0);

        let mut record = claimed(Approval::Rejected);
        let report = execute(&mut record, &effect).await.unwrap();

        assert_eq!(report, ExecutionReport::Skipped);
        assert_eq!(record.outcome(), Some(REJECTION_OUTCOME));
        assert_eq!(record.state(), CaseState::Rejected);
    }

    #[tokio::test]
    async fn test_approved_escalation_skips_effect() {
        let mut effect = MockRemediationEffect::new();
        effect.expect_apply().times(0);

        let mut record = CaseRecord::open(&Alert::new("inc-3", "Disk Full")).unwrap();
        for category in EvidenceCategory::ALL {
            record
                .record_evidence(category, EvidencePayload::unavailable("n/a"))
                .unwrap();
        }
        record
            .record_diagnosis(Diagnosis::insufficient_evidence())
            .unwrap();
        record.record_approval(Approval::Approved).unwrap();

        let report = execute(&mut record, &effect).await.unwrap();

        assert_eq!(report, ExecutionReport::Escalated);
        assert_eq!(record.outcome(), Some(ESCALATION_OUTCOME));
        assert_eq!(record.state(), CaseState::Approved);
    }

    #[tokio::test]
    async fn test_requires_claimed_decision() {
        let mut effect = MockRemediationEffect::new();
        effect.expect_apply().times(0);

        let mut record = CaseRecord::open(&Alert::new("inc-2", "High CPU Usage")).unwrap();
        let err = execute(&mut record, &effect).await.unwrap_err();

        assert!(matches!(err, IncidentError::MissingPrerequisite { .. }));
        assert!(record.outcome().is_none());
    }
}
