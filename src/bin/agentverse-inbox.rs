use std::sync::Arc;

use agentverse::config::Config;
use agentverse::error::Result;
use agentverse::interfaces::identity::Identity;
use agentverse::services::inbox::{self, InboxState, LoggingHandler};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "agentverse-inbox")]
#[command(about = "Receive and verify signed agent envelopes")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,

    #[arg(long, env = "AGENTVERSE_CONFIG")]
    config: Option<String>,

    #[arg(long, env = "AGENT_KEY", hide_env_values = true)]
    seed: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agentverse=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.agent_seed = Some(seed);
    }
    let identity = config.identity()?;

    let state = InboxState {
        address: identity.address().to_string(),
        handler: Arc::new(LoggingHandler),
    };
    inbox::run(&cli.host, cli.port, state).await
}
