#![allow(dead_code)]

use async_trait::async_trait;
use httpmock::MockServer;
use tokio::sync::Mutex;

use agentverse::config::Config;
use agentverse::domains::message::AgentMessage;
use agentverse::error::{AgentverseError, Result};
use agentverse::identity::AgentIdentity;
use agentverse::interfaces::handler::MessageHandler;
use agentverse::interfaces::identity::Identity;

pub const TOKEN: &str = "test-token";

pub fn identity(seed: &str) -> AgentIdentity {
    AgentIdentity::from_seed(seed, 0).unwrap()
}

pub fn config_for(server: &MockServer) -> Config {
    Config {
        almanac_api_url: server.url("/v1/almanac"),
        mailbox_api_url: server.url("/v1/agents"),
        agentverse_token: Some(TOKEN.to_string()),
        agent_seed: Some("alice".to_string()),
        agent_index: 0,
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
    }
}

#[derive(Default)]
pub struct RecordingHandler {
    pub messages: Mutex<Vec<AgentMessage>>,
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, message: AgentMessage) -> Result<()> {
        self.messages.lock().await.push(message);
        Ok(())
    }
}

pub struct FailingHandler;

#[async_trait]
impl MessageHandler for FailingHandler {
    async fn handle(&self, _message: AgentMessage) -> Result<()> {
        Err(AgentverseError::Config("handler offline".to_string()))
    }
}

/// Identity whose provider always refuses to sign.
pub struct BrokenSigner;

impl Identity for BrokenSigner {
    fn address(&self) -> &str {
        "agent1broken"
    }

    fn sign_digest(&self, _digest: &[u8]) -> Result<String> {
        Err(AgentverseError::Signing("hardware key unplugged".to_string()))
    }

    fn verify_digest(_address: &str, _digest: &[u8], _signature: &str) -> bool {
        false
    }
}
