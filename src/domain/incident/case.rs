//! Case record - the document threaded through an incident run

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::IncidentError;
use super::evidence::{EvidenceCategory, EvidencePayload};
use super::synthesizer::Diagnosis;
use crate::domain::storage::{StorageEntity, StorageKey};

/// Maximum length for case IDs
pub const MAX_CASE_ID_LENGTH: usize = 100;

static CASE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap());

/// Validated case identifier, assigned once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Result<Self, IncidentError> {
        let id = id.into();

        if id.is_empty() {
            return Err(IncidentError::invalid_alert("Case ID cannot be empty"));
        }

        if id.len() > MAX_CASE_ID_LENGTH {
            return Err(IncidentError::invalid_alert(format!(
                "Case ID exceeds maximum length of {} characters",
                MAX_CASE_ID_LENGTH
            )));
        }

        if !CASE_ID_PATTERN.is_match(&id) {
            return Err(IncidentError::invalid_alert(format!(
                "Invalid case ID '{}': must be alphanumeric with '.', '_' or '-'",
                id
            )));
        }

        Ok(Self(id))
    }

    /// Generate a fresh identifier for alerts that arrive without one
    pub fn generate() -> Self {
        Self(format!("inc-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CaseId {
    type Error = IncidentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CaseId> for String {
    fn from(id: CaseId) -> Self {
        id.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for CaseId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trigger input that opens a new run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub alert_type: String,
    #[serde(default)]
    pub alert_details: Value,
    /// Decision supplied up front; the run then goes straight through the gate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<bool>,
}

impl Alert {
    pub fn new(alert_id: impl Into<String>, alert_type: impl Into<String>) -> Self {
        Self {
            alert_id: alert_id.into(),
            alert_type: alert_type.into(),
            alert_details: Value::Object(Default::default()),
            decision: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.alert_details = details;
        self
    }

    pub fn with_decision(mut self, approved: bool) -> Self {
        self.decision = Some(approved);
        self
    }

    /// Detail lookup used by sources that honour per-alert overrides
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.alert_details.get(key)
    }
}

/// External decision recorded at the approval gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
    Approved,
    Rejected,
}

impl Approval {
    pub fn from_bool(approved: bool) -> Self {
        if approved {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Lifecycle position of a case, persisted as the storage state tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseState {
    /// Evidence and diagnosis are being produced
    Diagnosing,
    /// Parked at the approval gate
    Pending,
    /// Decision claimed, execution stage running
    Executing,
    /// Terminal, remediation was approved
    Approved,
    /// Terminal, remediation was rejected
    Rejected,
}

impl CaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnosing => "diagnosing",
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "diagnosing" => Some(Self::Diagnosing),
            "pending" => Some(Self::Pending),
            "executing" => Some(Self::Executing),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The accumulating record of one alert's diagnostic-and-remediation run.
///
/// Every field is write-once. The mutators enforce the ordering
/// evidence -> diagnosis -> approval -> outcome and refuse to overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    case_id: CaseId,
    alert_type: String,
    alert_details: Value,
    #[serde(default)]
    evidence: BTreeMap<EvidenceCategory, EvidencePayload>,
    #[serde(default)]
    diagnosis: Option<Diagnosis>,
    #[serde(default)]
    approval: Option<Approval>,
    #[serde(default)]
    outcome: Option<String>,
    state: CaseState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CaseRecord {
    /// Open a record for an alert. The case id is the alert id.
    pub fn open(alert: &Alert) -> Result<Self, IncidentError> {
        if alert.alert_type.trim().is_empty() {
            return Err(IncidentError::invalid_alert("alert_type cannot be empty"));
        }

        if !alert.alert_details.is_object() && !alert.alert_details.is_null() {
            return Err(IncidentError::invalid_alert(
                "alert_details must be a JSON object",
            ));
        }

        let case_id = if alert.alert_id.is_empty() {
            CaseId::generate()
        } else {
            CaseId::new(alert.alert_id.clone())?
        };

        let alert_details = if alert.alert_details.is_null() {
            Value::Object(Default::default())
        } else {
            alert.alert_details.clone()
        };

        let now = Utc::now();

        Ok(Self {
            case_id,
            alert_type: alert.alert_type.clone(),
            alert_details,
            evidence: BTreeMap::new(),
            diagnosis: None,
            approval: None,
            outcome: None,
            state: CaseState::Diagnosing,
            created_at: now,
            updated_at: now,
        })
    }

    /// The alert this record was opened for, as seen by diagnostic stages
    pub fn alert(&self) -> Alert {
        Alert {
            alert_id: self.case_id.to_string(),
            alert_type: self.alert_type.clone(),
            alert_details: self.alert_details.clone(),
            decision: None,
        }
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn alert_type(&self) -> &str {
        &self.alert_type
    }

    pub fn alert_details(&self) -> &Value {
        &self.alert_details
    }

    pub fn evidence(&self) -> &BTreeMap<EvidenceCategory, EvidencePayload> {
        &self.evidence
    }

    pub fn evidence_for(&self, category: EvidenceCategory) -> Option<&EvidencePayload> {
        self.evidence.get(&category)
    }

    pub fn has_evidence(&self, category: EvidenceCategory) -> bool {
        self.evidence.contains_key(&category)
    }

    pub fn evidence_complete(&self) -> bool {
        EvidenceCategory::ALL.iter().all(|c| self.has_evidence(*c))
    }

    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        self.diagnosis.as_ref()
    }

    pub fn approval(&self) -> Option<Approval> {
        self.approval
    }

    pub fn outcome(&self) -> Option<&str> {
        self.outcome.as_deref()
    }

    pub fn state(&self) -> CaseState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Write the payload owned by one diagnostic stage
    pub fn record_evidence(
        &mut self,
        category: EvidenceCategory,
        payload: EvidencePayload,
    ) -> Result<(), IncidentError> {
        let field = format!("evidence.{}", category);

        if self.evidence.contains_key(&category) {
            return Err(IncidentError::field_already_set(self.case_id.as_str(), field));
        }

        if !payload.fits(category) {
            return Err(IncidentError::missing_prerequisite(
                self.case_id.as_str(),
                field,
                format!("a {} payload, got {}", category, payload.kind()),
            ));
        }

        self.evidence.insert(category, payload);
        self.touch();
        Ok(())
    }

    /// Write the synthesizer's hypothesis. Requires all three categories.
    pub fn record_diagnosis(&mut self, diagnosis: Diagnosis) -> Result<(), IncidentError> {
        if self.diagnosis.is_some() {
            return Err(IncidentError::field_already_set(
                self.case_id.as_str(),
                "diagnosis",
            ));
        }

        if !self.evidence_complete() {
            return Err(IncidentError::missing_prerequisite(
                self.case_id.as_str(),
                "diagnosis",
                "metric, log and change evidence",
            ));
        }

        self.diagnosis = Some(diagnosis);
        self.touch();
        Ok(())
    }

    /// Write the gate decision. Only a parked record accepts one.
    pub fn record_approval(&mut self, approval: Approval) -> Result<(), IncidentError> {
        if self.state != CaseState::Pending {
            return Err(IncidentError::invalid_transition(
                self.case_id.as_str(),
                self.state.as_str(),
                "submit a decision",
            ));
        }

        self.approval = Some(approval);
        self.touch();
        Ok(())
    }

    /// Write the final report. Requires a decision.
    pub fn record_outcome(&mut self, outcome: impl Into<String>) -> Result<(), IncidentError> {
        if self.outcome.is_some() {
            return Err(IncidentError::field_already_set(
                self.case_id.as_str(),
                "outcome",
            ));
        }

        if self.approval.is_none() {
            return Err(IncidentError::missing_prerequisite(
                self.case_id.as_str(),
                "outcome",
                "an approval decision",
            ));
        }

        self.outcome = Some(outcome.into());
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.state = self.derive_state();
        self.updated_at = Utc::now();
    }

    fn derive_state(&self) -> CaseState {
        match (self.approval, &self.outcome, &self.diagnosis) {
            (Some(Approval::Approved), Some(_), _) => CaseState::Approved,
            (Some(Approval::Rejected), Some(_), _) => CaseState::Rejected,
            (Some(_), None, _) => CaseState::Executing,
            (None, _, Some(_)) => CaseState::Pending,
            (None, _, None) => CaseState::Diagnosing,
        }
    }
}

impl StorageEntity for CaseRecord {
    type Key = CaseId;

    fn key(&self) -> &Self::Key {
        &self.case_id
    }

    fn state_tag(&self) -> Option<&str> {
        Some(self.state.as_str())
    }
}
