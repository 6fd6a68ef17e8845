//! Simulated remediation effect

use async_trait::async_trait;
use tracing::info;

use crate::domain::incident::{CaseId, RemediationEffect};
use crate::domain::DomainError;

/// Pretends to run the recommended action against the platform.
///
/// Configured with a failure message, every call fails with it. Useful for
/// exercising the failed-remediation path from the CLI.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRemediation {
    failure: Option<String>,
}

impl SimulatedRemediation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl RemediationEffect for SimulatedRemediation {
    async fn apply(&self, case_id: &CaseId, action: &str) -> Result<String, DomainError> {
        if let Some(message) = &self.failure {
            return Err(DomainError::provider("remediation", message.clone()));
        }

        info!(case_id = %case_id, action = %action, "Applying remediation");
        Ok(format!("{} dispatched for {}", action, case_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_succeeds_by_default() {
        let effect = SimulatedRemediation::new();
        let case_id = CaseId::new("inc-1").unwrap();

        let result = effect.apply(&case_id, "Restart affected service").await.unwrap();
        assert!(result.contains("inc-1"));
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let effect = SimulatedRemediation::failing("API timeout");
        let case_id = CaseId::new("inc-1").unwrap();

        let err = effect.apply(&case_id, "Rollback Deployment #1234").await.unwrap_err();
        assert!(err.to_string().contains("API timeout"));
    }
}
