//! Incident command - drives cases through the engine without the HTTP layer
//!
//! With the postgres backend a case started here can be decided from another
//! process (or through the API) later.

use clap::{Args, Subcommand};
use serde_json::Value;

use crate::api::types::{CaseListResponse, CaseResponse};
use crate::domain::{Alert, CaseId, CaseState, IncidentEngine};

#[derive(Args)]
pub struct IncidentArgs {
    #[command(subcommand)]
    pub command: IncidentCommand,
}

#[derive(Subcommand)]
pub enum IncidentCommand {
    /// Open a case and run it to the approval gate
    Start {
        /// Alert identifier, used as the case id
        #[arg(long)]
        alert_id: Option<String>,

        /// Alert type, e.g. "High CPU Usage"
        #[arg(long)]
        alert_type: String,

        /// Alert details as a JSON object
        #[arg(long)]
        details: Option<String>,

        /// Approve the recommended action without parking at the gate
        #[arg(long, conflicts_with = "reject")]
        approve: bool,

        /// Reject the recommended action without parking at the gate
        #[arg(long)]
        reject: bool,
    },

    /// Approve (or with --reject, reject) a parked case
    Decide {
        case_id: String,

        #[arg(long)]
        reject: bool,
    },

    /// Print a case record
    Show { case_id: String },

    /// List case records
    List {
        /// Only cases in this state (diagnosing, pending, executing, approved, rejected)
        #[arg(long)]
        state: Option<String>,
    },

    /// Delete a case record
    Abandon { case_id: String },
}

/// Run the incident command
pub async fn run(args: IncidentArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    let state = crate::create_app_state_with_config(&config).await?;

    let output = execute(state.incident_engine.as_ref(), args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

pub(crate) async fn execute(
    engine: &dyn IncidentEngine,
    command: IncidentCommand,
) -> anyhow::Result<Value> {
    let output = match command {
        IncidentCommand::Start {
            alert_id,
            alert_type,
            details,
            approve,
            reject,
        } => {
            let details = match details {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("--details is not valid JSON: {}", e))?,
                None => Value::Null,
            };

            let mut alert =
                Alert::new(alert_id.unwrap_or_default(), alert_type).with_details(details);
            if approve || reject {
                alert = alert.with_decision(approve);
            }

            serde_json::to_value(CaseResponse::from(engine.start(alert).await?))?
        }
        IncidentCommand::Decide { case_id, reject } => {
            let case_id = CaseId::new(case_id)?;
            serde_json::to_value(CaseResponse::from(engine.resume(&case_id, !reject).await?))?
        }
        IncidentCommand::Show { case_id } => {
            let case_id = CaseId::new(case_id)?;
            let record = engine
                .get(&case_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Case '{}' not found", case_id))?;
            serde_json::to_value(CaseResponse::from(record))?
        }
        IncidentCommand::List { state } => {
            let filter = match state {
                Some(raw) => Some(
                    CaseState::from_str(&raw)
                        .ok_or_else(|| anyhow::anyhow!("Unknown case state '{}'", raw))?,
                ),
                None => None,
            };
            serde_json::to_value(CaseListResponse::new(engine.list(filter).await?))?
        }
        IncidentCommand::Abandon { case_id } => {
            let case_id = CaseId::new(case_id)?;
            let deleted = engine.abandon(&case_id).await?;
            serde_json::json!({ "case_id": case_id, "deleted": deleted })
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::incident::{
        IncidentWorkflowEngine, SimulatedRemediation, SimulatedSource,
    };
    use crate::infrastructure::storage::InMemoryStorage;

    fn engine() -> IncidentWorkflowEngine {
        IncidentWorkflowEngine::new(
            Arc::new(InMemoryStorage::new()),
            SimulatedSource::all(),
            Arc::new(SimulatedRemediation::new()),
        )
    }

    fn start(id: &str) -> IncidentCommand {
        IncidentCommand::Start {
            alert_id: Some(id.to_string()),
            alert_type: "High CPU Usage".to_string(),
            details: Some(r#"{"host": "risk-01"}"#.to_string()),
            approve: false,
            reject: false,
        }
    }

    #[tokio::test]
    async fn test_start_decide_show() {
        let engine = engine();

        let started = execute(&engine, start("inc-1")).await.unwrap();
        assert_eq!(started["state"], "pending");

        let decided = execute(
            &engine,
            IncidentCommand::Decide {
                case_id: "inc-1".to_string(),
                reject: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(decided["state"], "rejected");
        assert_eq!(decided["gate"], "REJECTED");

        let shown = execute(
            &engine,
            IncidentCommand::Show {
                case_id: "inc-1".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(shown["outcome"], decided["outcome"]);
    }

    #[tokio::test]
    async fn test_start_with_approval_runs_to_completion() {
        let engine = engine();

        let output = execute(
            &engine,
            IncidentCommand::Start {
                alert_id: Some("inc-9".to_string()),
                alert_type: "High CPU Usage".to_string(),
                details: None,
                approve: true,
                reject: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(output["state"], "approved");
    }

    #[tokio::test]
    async fn test_invalid_details_json() {
        let engine = engine();

        let err = execute(
            &engine,
            IncidentCommand::Start {
                alert_id: None,
                alert_type: "High CPU Usage".to_string(),
                details: Some("{not json".to_string()),
                approve: false,
                reject: false,
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("--details"));
    }

    #[tokio::test]
    async fn test_list_and_abandon() {
        let engine = engine();
        execute(&engine, start("inc-1")).await.unwrap();

        let listed = execute(
            &engine,
            IncidentCommand::List {
                state: Some("pending".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(listed["total"], 1);

        let abandoned = execute(
            &engine,
            IncidentCommand::Abandon {
                case_id: "inc-1".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(abandoned["deleted"], true);

        let err = execute(&engine, IncidentCommand::List { state: Some("done".to_string()) })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown case state"));
    }
}
