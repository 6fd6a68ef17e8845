//! CLI module for the ChatOps console
//!
//! Provides subcommands for:
//! - `serve`: HTTP API server
//! - `incident`: drive incident cases against the configured case store
//! - `chat`: route a single chat query
//! - `demo`: run the High CPU scenario end to end in memory

pub mod chat;
pub mod demo;
pub mod incident;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// ChatOps console - incident remediation with a human approval gate
#[derive(Parser)]
#[command(name = "chatops-console")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Start, decide, inspect or abandon incident cases
    Incident(incident::IncidentArgs),

    /// Classify a chat query and print what it was routed to
    Chat(chat::ChatArgs),

    /// Walk the High CPU scenario through the approval gate
    Demo(demo::DemoArgs),
}

/// Load `.env`, configuration files and `APP__*` overrides, then install logging
pub(crate) fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    config
}
