use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{AgentverseError, Result};
use crate::identity::AgentIdentity;

pub const DEFAULT_ALMANAC_API_URL: &str = "https://agentverse.ai/v1/almanac";
pub const DEFAULT_MAILBOX_API_URL: &str = "https://agentverse.ai/v1/agents";

fn default_almanac_api_url() -> String {
    DEFAULT_ALMANAC_API_URL.to_string()
}

fn default_mailbox_api_url() -> String {
    DEFAULT_MAILBOX_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_almanac_api_url")]
    pub almanac_api_url: String,
    #[serde(default = "default_mailbox_api_url")]
    pub mailbox_api_url: String,
    #[serde(default)]
    pub agentverse_token: Option<String>,
    #[serde(default)]
    pub agent_seed: Option<String>,
    #[serde(default)]
    pub agent_index: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            almanac_api_url: default_almanac_api_url(),
            mailbox_api_url: default_mailbox_api_url(),
            agentverse_token: None,
            agent_seed: None,
            agent_index: 0,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| AgentverseError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| AgentverseError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn identity(&self) -> Result<AgentIdentity> {
        let seed = self
            .agent_seed
            .as_deref()
            .filter(|seed| !seed.trim().is_empty())
            .ok_or_else(|| AgentverseError::Config("agent seed is not set".to_string()))?;
        AgentIdentity::from_seed(seed, self.agent_index)
    }

    pub fn token(&self) -> Result<&str> {
        self.agentverse_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AgentverseError::Config("agentverse token is not set".to_string()))
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .map_err(|e| AgentverseError::Config(e.to_string()))
    }
}
