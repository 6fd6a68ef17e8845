//! Incident infrastructure - engine and simulated collaborators

mod engine_impl;
mod remediation;
mod sources;

pub use engine_impl::{IncidentEngineConfig, IncidentWorkflowEngine};
pub use remediation::SimulatedRemediation;
pub use sources::{SimulatedSource, HIGH_CPU_ALERT};
