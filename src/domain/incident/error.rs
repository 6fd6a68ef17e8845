//! Incident workflow error types

use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised by the incident workflow engine and the case record.
///
/// None of these leave a stored case in an undefined state: a rejected
/// operation never mutates the persisted record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IncidentError {
    #[error("Unknown case: {0}")]
    UnknownCase(String),

    #[error("Case already exists: {0}")]
    DuplicateCase(String),

    #[error("Invalid transition for case '{case_id}': cannot {operation} while {state}")]
    InvalidTransition {
        case_id: String,
        state: String,
        operation: String,
    },

    #[error("Field '{field}' of case '{case_id}' is already set")]
    FieldAlreadySet { case_id: String, field: String },

    #[error("Field '{field}' of case '{case_id}' requires {requires}")]
    MissingPrerequisite {
        case_id: String,
        field: String,
        requires: String,
    },

    #[error("Invalid alert: {0}")]
    InvalidAlert(String),

    #[error("Case store error: {0}")]
    Storage(String),
}

impl IncidentError {
    pub fn unknown_case(case_id: impl Into<String>) -> Self {
        Self::UnknownCase(case_id.into())
    }

    pub fn duplicate_case(case_id: impl Into<String>) -> Self {
        Self::DuplicateCase(case_id.into())
    }

    pub fn invalid_transition(
        case_id: impl Into<String>,
        state: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            case_id: case_id.into(),
            state: state.into(),
            operation: operation.into(),
        }
    }

    pub fn field_already_set(case_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldAlreadySet {
            case_id: case_id.into(),
            field: field.into(),
        }
    }

    pub fn missing_prerequisite(
        case_id: impl Into<String>,
        field: impl Into<String>,
        requires: impl Into<String>,
    ) -> Self {
        Self::MissingPrerequisite {
            case_id: case_id.into(),
            field: field.into(),
            requires: requires.into(),
        }
    }

    pub fn invalid_alert(message: impl Into<String>) -> Self {
        Self::InvalidAlert(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<IncidentError> for DomainError {
    fn from(err: IncidentError) -> Self {
        match err {
            IncidentError::UnknownCase(id) => {
                DomainError::not_found(format!("Case '{}' not found", id))
            }
            IncidentError::DuplicateCase(id) => {
                DomainError::conflict(format!("Case '{}' already exists", id))
            }
            err @ IncidentError::InvalidTransition { .. } => DomainError::conflict(err.to_string()),
            IncidentError::InvalidAlert(message) => DomainError::validation(message),
            IncidentError::Storage(message) => DomainError::storage(message),
            err @ (IncidentError::FieldAlreadySet { .. }
            | IncidentError::MissingPrerequisite { .. }) => DomainError::internal(err.to_string()),
        }
    }
}
