use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::attestation::{AgentEndpoint, AgentRegistrationAttestation};
use crate::error::{AgentverseError, Result};
use crate::services::http::{address_path, ensure_success, join_url};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    #[serde(default)]
    pub endpoints: Vec<AgentEndpoint>,
    #[serde(default)]
    pub protocols: Vec<String>,
}

impl AgentRecord {
    /// First listed endpoint; weights are not used for selection.
    pub fn primary_endpoint(&self) -> Option<&AgentEndpoint> {
        self.endpoints.first()
    }
}

#[derive(Clone)]
pub struct AlmanacClient {
    base_url: String,
    http: reqwest::Client,
}

impl AlmanacClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub async fn submit_attestation(&self, attestation: &AgentRegistrationAttestation) -> Result<()> {
        let url = join_url(&self.base_url, "agents");
        debug!(url = %url, address = %attestation.agent_address, "submitting attestation");
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(attestation)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn get_agent(&self, address: &str) -> Result<AgentRecord> {
        let url = join_url(&self.base_url, &format!("agents/{}", address_path(address)));
        debug!(url = %url, "looking up agent");
        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AgentverseError::NotFound(format!(
                "agent {address} is not registered in the almanac"
            )));
        }
        let response = ensure_success(response).await?;
        response
            .json::<AgentRecord>()
            .await
            .map_err(|e| AgentverseError::Serialization(e.to_string()))
    }

    pub async fn lookup_endpoint(&self, address: &str) -> Result<String> {
        let record = self.get_agent(address).await?;
        record
            .primary_endpoint()
            .map(|endpoint| endpoint.url.clone())
            .ok_or_else(|| {
                AgentverseError::NotFound(format!("agent {address} has no registered endpoints"))
            })
    }
}
