use clap::Parser;
use chatops_console::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Incident(args) => cli::incident::run(args).await,
        Command::Chat(args) => cli::chat::run(args).await,
        Command::Demo(args) => cli::demo::run(args).await,
    }
}
