//! Incident workflow engine implementation

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::incident::{
    execution, gate, gather, Alert, CaseId, CaseRecord, CaseState, Decision, EvidenceCategory,
    EvidencePayload, EvidenceSource, ExecutionReport, IncidentEngine, IncidentError,
    RemediationEffect, RootCauseSynthesizer, Stage, PIPELINE,
};
use crate::domain::storage::Storage;
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_case_started, record_decision, record_evidence_unavailable, record_remediation_failure,
};

/// States in which no run owns the record
const ABANDONABLE: [CaseState; 3] = [CaseState::Pending, CaseState::Approved, CaseState::Rejected];

/// Configuration for the incident engine
#[derive(Debug, Clone, Default)]
pub struct IncidentEngineConfig {
    /// Join the three diagnostic stages concurrently instead of in order
    pub parallel_diagnostics: bool,
}

/// Incident engine that interprets [`PIPELINE`] against a durable case store
#[derive(Debug)]
pub struct IncidentWorkflowEngine {
    store: Arc<dyn Storage<CaseRecord>>,
    sources: BTreeMap<EvidenceCategory, Arc<dyn EvidenceSource>>,
    effect: Arc<dyn RemediationEffect>,
    synthesizer: RootCauseSynthesizer,
    config: IncidentEngineConfig,
}

impl IncidentWorkflowEngine {
    /// Create an engine. Each source is registered under its own category;
    /// a category with no source always yields the unavailable sentinel.
    pub fn new(
        store: Arc<dyn Storage<CaseRecord>>,
        sources: Vec<Arc<dyn EvidenceSource>>,
        effect: Arc<dyn RemediationEffect>,
    ) -> Self {
        Self::with_config(store, sources, effect, IncidentEngineConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(
        store: Arc<dyn Storage<CaseRecord>>,
        sources: Vec<Arc<dyn EvidenceSource>>,
        effect: Arc<dyn RemediationEffect>,
        config: IncidentEngineConfig,
    ) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.category(), source))
            .collect();

        Self {
            store,
            sources,
            effect,
            synthesizer: RootCauseSynthesizer::new(),
            config,
        }
    }

    /// Run `stages` in order, stopping at the approval gate
    async fn run(&self, record: &mut CaseRecord, stages: &[Stage]) -> Result<(), IncidentError> {
        let alert = record.alert();

        if self.config.parallel_diagnostics
            && stages.iter().any(|s| matches!(s, Stage::Collect(_)))
        {
            self.collect_concurrently(record, &alert).await?;
        }

        for stage in stages {
            debug!(case_id = %record.case_id(), stage = %stage, "Running stage");

            match *stage {
                Stage::Collect(category) => {
                    if record.has_evidence(category) {
                        continue;
                    }
                    let payload = self.collect(category, &alert).await;
                    record.record_evidence(category, payload)?;
                }
                Stage::Synthesize => {
                    let diagnosis = self.synthesizer.synthesize(record.evidence());
                    debug!(
                        case_id = %record.case_id(),
                        action = %diagnosis.recommended_action,
                        "Diagnosis synthesized"
                    );
                    record.record_diagnosis(diagnosis)?;
                }
                Stage::ApprovalGate => {
                    self.checkpoint(record, CaseState::Diagnosing).await?;
                    info!(case_id = %record.case_id(), "Case parked at approval gate");
                    return Ok(());
                }
                Stage::Execute => {
                    let report = execution::execute(record, self.effect.as_ref()).await?;

                    match &report {
                        ExecutionReport::Failed(error) => {
                            warn!(
                                case_id = %record.case_id(),
                                error = %error,
                                "Remediation failed"
                            );
                            record_remediation_failure();
                        }
                        ExecutionReport::Escalated => {
                            info!(case_id = %record.case_id(), "Escalated without remediation");
                        }
                        ExecutionReport::Applied | ExecutionReport::Skipped => {}
                    }

                    self.checkpoint(record, CaseState::Executing).await?;
                    info!(
                        case_id = %record.case_id(),
                        state = %record.state(),
                        "Case completed"
                    );
                }
            }
        }

        Ok(())
    }

    async fn collect(&self, category: EvidenceCategory, alert: &Alert) -> EvidencePayload {
        let payload = match self.sources.get(&category) {
            Some(source) => gather(source.as_ref(), alert).await,
            None => EvidencePayload::unavailable(format!("no {} source configured", category)),
        };

        if let EvidencePayload::Unavailable { reason } = &payload {
            warn!(
                alert_id = %alert.alert_id,
                category = %category,
                reason = %reason,
                "Evidence unavailable, continuing with sentinel"
            );
            record_evidence_unavailable(category);
        }

        payload
    }

    async fn collect_concurrently(
        &self,
        record: &mut CaseRecord,
        alert: &Alert,
    ) -> Result<(), IncidentError> {
        let (metric, log, change) = futures::join!(
            self.collect(EvidenceCategory::Metric, alert),
            self.collect(EvidenceCategory::Log, alert),
            self.collect(EvidenceCategory::Change, alert),
        );

        for (category, payload) in [
            (EvidenceCategory::Metric, metric),
            (EvidenceCategory::Log, log),
            (EvidenceCategory::Change, change),
        ] {
            if !record.has_evidence(category) {
                record.record_evidence(category, payload)?;
            }
        }

        Ok(())
    }

    /// Apply a decision and claim the transition in the store. Exactly one
    /// concurrent caller wins; the rest see `InvalidTransition`.
    async fn claim(&self, record: &mut CaseRecord, approved: bool) -> Result<(), IncidentError> {
        let decision = Decision::new(record.case_id().clone(), approved);
        gate::submit(record, &decision)?;

        self.checkpoint(record, CaseState::Pending).await?;
        record_decision(decision.approval());

        info!(
            case_id = %record.case_id(),
            decision = %decision.approval().as_str(),
            "Decision accepted, resuming at execution"
        );

        Ok(())
    }

    /// Persist `record`, provided the stored copy is still in `expected`
    async fn checkpoint(
        &self,
        record: &CaseRecord,
        expected: CaseState,
    ) -> Result<(), IncidentError> {
        let case_id = record.case_id().as_str();

        match self.store.update_if_state(record.clone(), expected.as_str()).await {
            Ok(_) => Ok(()),
            Err(DomainError::NotFound { .. }) => Err(IncidentError::unknown_case(case_id)),
            Err(DomainError::Conflict { .. }) => Err(IncidentError::invalid_transition(
                case_id,
                format!("no longer {}", expected),
                format!("move to {}", record.state()),
            )),
            Err(e) => Err(store_error(e)),
        }
    }
}

fn store_error(err: DomainError) -> IncidentError {
    IncidentError::storage(err.to_string())
}

#[async_trait]
impl IncidentEngine for IncidentWorkflowEngine {
    async fn start(&self, alert: Alert) -> Result<CaseRecord, IncidentError> {
        let mut record = CaseRecord::open(&alert)?;

        match self.store.create(record.clone()).await {
            Ok(_) => {}
            Err(DomainError::Conflict { .. }) => {
                return Err(IncidentError::duplicate_case(record.case_id().as_str()));
            }
            Err(e) => return Err(store_error(e)),
        }

        record_case_started(record.alert_type());
        info!(
            case_id = %record.case_id(),
            alert_type = %record.alert_type(),
            "Incident case opened"
        );

        self.run(&mut record, &PIPELINE).await?;

        if let Some(approved) = alert.decision {
            self.claim(&mut record, approved).await?;
            self.run(&mut record, Stage::after_gate()).await?;
        }

        Ok(record)
    }

    async fn resume(&self, case_id: &CaseId, approved: bool) -> Result<CaseRecord, IncidentError> {
        let mut record = self
            .store
            .get(case_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| IncidentError::unknown_case(case_id.as_str()))?;

        self.claim(&mut record, approved).await?;
        self.run(&mut record, Stage::after_gate()).await?;

        Ok(record)
    }

    async fn get(&self, case_id: &CaseId) -> Result<Option<CaseRecord>, IncidentError> {
        self.store.get(case_id).await.map_err(store_error)
    }

    async fn list(&self, state: Option<CaseState>) -> Result<Vec<CaseRecord>, IncidentError> {
        let mut records = match state {
            Some(state) => self.store.list_by_state(state.as_str()).await,
            None => self.store.list().await,
        }
        .map_err(store_error)?;

        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.case_id().cmp(b.case_id()))
        });

        Ok(records)
    }

    async fn abandon(&self, case_id: &CaseId) -> Result<bool, IncidentError> {
        let allowed = ABANDONABLE.map(|state| state.as_str());

        let removed = match self.store.delete_if_state(case_id, &allowed).await {
            Ok(removed) => removed,
            Err(DomainError::Conflict { .. }) => {
                let state = self
                    .store
                    .get(case_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|record| record.state().to_string())
                    .unwrap_or_else(|| "running".to_string());
                return Err(IncidentError::invalid_transition(
                    case_id.as_str(),
                    state,
                    "abandon a case with a run in flight",
                ));
            }
            Err(e) => return Err(store_error(e)),
        };

        if removed {
            info!(case_id = %case_id, "Incident case abandoned");
        }

        Ok(removed)
    }
}
