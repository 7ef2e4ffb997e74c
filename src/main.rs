use std::fs;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use agentverse::config::Config;
use agentverse::error::{AgentverseError, Result};
use agentverse::interfaces::identity::Identity;
use agentverse::services::registration::RegistrationRequest;
use agentverse::AgentverseClient;

#[derive(Parser, Debug)]
#[command(name = "agentverse")]
#[command(about = "Register agents in the Almanac and send them signed messages")]
struct Cli {
    #[arg(long, env = "AGENTVERSE_CONFIG")]
    config: Option<String>,

    #[arg(long, env = "AGENTVERSE_KEY", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "AGENT_KEY", hide_env_values = true)]
    seed: Option<String>,

    #[arg(long)]
    index: Option<u64>,

    #[arg(long)]
    almanac_url: Option<String>,

    #[arg(long)]
    mailbox_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the agent address derived from the seed.
    Address,
    Register {
        #[arg(short, long)]
        name: String,

        /// Path to the readme published with the agent.
        #[arg(short, long)]
        readme: String,

        #[arg(short, long)]
        webhook: String,

        #[arg(long)]
        protocol_digest: String,
    },
    Lookup {
        #[arg(long)]
        address: String,
    },
    Send {
        #[arg(long)]
        target: String,

        #[arg(long)]
        schema_digest: String,

        #[arg(long)]
        protocol_digest: Option<String>,

        /// JSON payload.
        #[arg(long)]
        payload: String,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(token) = &cli.token {
        config.agentverse_token = Some(token.clone());
    }
    if let Some(seed) = &cli.seed {
        config.agent_seed = Some(seed.clone());
    }
    if let Some(index) = cli.index {
        config.agent_index = index;
    }
    if let Some(url) = &cli.almanac_url {
        config.almanac_api_url = url.clone();
    }
    if let Some(url) = &cli.mailbox_url {
        config.mailbox_api_url = url.clone();
    }
    Ok(config)
}

fn load_readme(path: &str) -> Result<String> {
    fs::read_to_string(path)
        .map(|content| content.trim().to_string())
        .map_err(|e| AgentverseError::Io(format!("unable to read readme at {path}: {e}")))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,agentverse=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let identity = config.identity();

    match cli.command {
        Commands::Address => {
            println!("{}", identity?.address());
        }
        Commands::Register {
            name,
            readme,
            webhook,
            protocol_digest,
        } => {
            let request = RegistrationRequest {
                endpoint_url: webhook,
                protocol_digest,
                name,
                readme: load_readme(&readme)?,
            };
            let identity = identity?;
            let client = AgentverseClient::from_config(config)?;
            let outcome = client.register(&identity, &request).await?;
            let action = if outcome.created { "created" } else { "updated" };
            println!("Agent {action} @ {}", outcome.address);
        }
        Commands::Lookup { address } => {
            let client = AgentverseClient::from_config(config)?;
            let record = client.lookup(&address).await?;
            let rendered = serde_json::to_string_pretty(&record)
                .map_err(|e| AgentverseError::Serialization(e.to_string()))?;
            println!("{rendered}");
        }
        Commands::Send {
            target,
            schema_digest,
            protocol_digest,
            payload,
        } => {
            let payload: Value = serde_json::from_str(&payload)
                .map_err(|e| AgentverseError::Serialization(format!("payload is not json: {e}")))?;
            let identity = identity?;
            let client = AgentverseClient::from_config(config)?;
            let envelope = client
                .send(
                    &identity,
                    &target,
                    protocol_digest.as_deref(),
                    &schema_digest,
                    &payload,
                )
                .await?;
            println!("Sent session {} to {}", envelope.session, envelope.target);
        }
    }
    Ok(())
}
