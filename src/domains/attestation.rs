use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::domains::canonical::to_canonical_json;
use crate::error::{AgentverseError, Result};
use crate::identity::AgentIdentity;
use crate::interfaces::identity::Identity;

pub const DEFAULT_ENDPOINT_WEIGHT: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpoint {
    pub url: String,
    pub weight: i64,
}

impl AgentEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            weight: DEFAULT_ENDPOINT_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistrationAttestation {
    pub agent_address: String,
    pub protocols: Vec<String>,
    pub endpoints: Vec<AgentEndpoint>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl AgentRegistrationAttestation {
    pub fn new(
        agent_address: impl Into<String>,
        protocols: Vec<String>,
        endpoints: Vec<AgentEndpoint>,
    ) -> Self {
        Self {
            agent_address: agent_address.into(),
            protocols,
            endpoints,
            metadata: None,
            signature: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn canonical_value(&self) -> Value {
        let mut protocols = self.protocols.clone();
        protocols.sort();
        let mut endpoints = self.endpoints.clone();
        endpoints.sort_by(|a, b| a.url.cmp(&b.url));
        json!({
            "agent_address": self.agent_address,
            "protocols": protocols,
            "endpoints": endpoints,
            "metadata": self.metadata,
        })
    }

    pub fn digest(&self) -> Result<[u8; 32]> {
        let bytes = to_canonical_json(&self.canonical_value())?;
        Ok(Sha256::digest(&bytes).into())
    }

    pub fn sign(&mut self, identity: &dyn Identity) -> Result<()> {
        let digest = self.digest()?;
        let signature = identity
            .sign_digest(&digest)
            .map_err(|e| AgentverseError::Signing(format!("failed to sign attestation: {e}")))?;
        self.signature = Some(signature);
        Ok(())
    }

    pub fn verify(&self) -> Result<bool> {
        self.verify_with::<AgentIdentity>()
    }

    pub fn verify_with<I: Identity>(&self) -> Result<bool> {
        let signature = self.signature.as_deref().ok_or_else(|| {
            AgentverseError::Config("attestation signature is missing".to_string())
        })?;
        Ok(I::verify_digest(&self.agent_address, &self.digest()?, signature))
    }
}
