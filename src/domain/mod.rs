//! Domain layer - Core business logic and entities

pub mod chatops;
pub mod error;
pub mod incident;
pub mod storage;

pub use chatops::{
    Intent, IntentFallback, IntentRouter, KnowledgeDocument, KnowledgeHit, KnowledgeSearch,
    LiveDataSnapshot, LiveDataSource,
};
pub use error::DomainError;
pub use incident::{
    Alert, Approval, CaseId, CaseRecord, CaseState, Decision, Diagnosis, EvidenceCategory,
    EvidencePayload, EvidenceSource, GateState, IncidentEngine, IncidentError, RemediationEffect,
    RootCauseSynthesizer, Stage, PIPELINE,
};
pub use storage::{Storage, StorageEntity, StorageKey};
