//! Chat command - routes one query and prints the gathered context

use clap::Args;

#[derive(Args)]
pub struct ChatArgs {
    /// The operator's question
    pub query: String,

    /// Earlier conversation turns, oldest first
    #[arg(long)]
    pub history: Vec<String>,
}

/// Run the chat command
pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let config = super::load_config();
    let router = crate::create_chat_router(&config)?;

    let routing = router.handle(&args.query, &args.history.join("\n")).await?;
    println!("{}", serde_json::to_string_pretty(&routing)?);

    Ok(())
}
