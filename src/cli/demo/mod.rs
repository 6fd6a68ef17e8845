//! Demo command - the High CPU incident from alert to outcome
//!
//! Uses an in-memory store regardless of configuration. The run parks at the
//! approval gate, prints the diagnosis, then resumes with the chosen decision.

use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::domain::{Alert, CaseRecord, IncidentEngine};
use crate::infrastructure::incident::{
    IncidentEngineConfig, IncidentWorkflowEngine, SimulatedRemediation, SimulatedSource,
    HIGH_CPU_ALERT,
};
use crate::infrastructure::storage::InMemoryStorage;

#[derive(Args)]
pub struct DemoArgs {
    /// Reject the recommended action instead of approving it
    #[arg(long)]
    pub reject: bool,

    /// Make the remediation fail with this message
    #[arg(long)]
    pub fail_with: Option<String>,

    /// Collect metric, log and change evidence concurrently
    #[arg(long)]
    pub parallel: bool,
}

/// Run the demo
pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    super::load_config();

    let (parked, finished) = run_scenario(&args).await?;

    print_record("Parked at approval gate", &parked);
    print_record("Finished", &finished);

    Ok(())
}

pub(crate) async fn run_scenario(args: &DemoArgs) -> anyhow::Result<(CaseRecord, CaseRecord)> {
    let effect = match &args.fail_with {
        Some(message) => SimulatedRemediation::failing(message.clone()),
        None => SimulatedRemediation::new(),
    };

    let engine = IncidentWorkflowEngine::with_config(
        Arc::new(InMemoryStorage::new()),
        SimulatedSource::all(),
        Arc::new(effect),
        IncidentEngineConfig {
            parallel_diagnostics: args.parallel,
        },
    );

    let alert = Alert::new("demo-high-cpu", HIGH_CPU_ALERT)
        .with_details(serde_json::json!({"host": "risk-engine-01", "threshold": "90%"}));

    let parked = engine.start(alert).await?;
    info!(case_id = %parked.case_id(), "Awaiting operator decision");

    let finished = engine.resume(parked.case_id(), !args.reject).await?;

    Ok((parked, finished))
}

fn print_record(title: &str, record: &CaseRecord) {
    println!("== {} ({})", title, record.state());

    for (category, payload) in record.evidence() {
        let rendered =
            serde_json::to_string(payload).unwrap_or_else(|_| payload.kind().to_string());
        println!("  {:<8} {}", category.as_str(), rendered);
    }

    if let Some(diagnosis) = record.diagnosis() {
        println!("  cause    {}", diagnosis.cause);
        println!("  action   {}", diagnosis.recommended_action);
    }

    if let Some(outcome) = record.outcome() {
        println!("  outcome  {}", outcome);
    }
}
