use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domains::message::AgentMessage;
use crate::error::{AgentverseError, Result};
use crate::identity::AgentIdentity;
use crate::interfaces::identity::Identity;

pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub sender: String,
    pub target: String,
    pub session: Uuid,
    pub schema_digest: String,
    #[serde(default)]
    pub protocol_digest: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub expires: Option<u64>,
    #[serde(default)]
    pub nonce: Option<u64>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl Envelope {
    pub fn new(
        sender: impl Into<String>,
        target: impl Into<String>,
        schema_digest: impl Into<String>,
        protocol_digest: Option<String>,
    ) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            sender: sender.into(),
            target: target.into(),
            session: Uuid::new_v4(),
            schema_digest: schema_digest.into(),
            protocol_digest,
            payload: None,
            expires: None,
            nonce: None,
            signature: None,
        }
    }

    pub fn with_expires(mut self, expires: u64) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn encode_payload(&mut self, json_text: &str) {
        self.payload = Some(BASE64.encode(json_text.as_bytes()));
    }

    pub fn decode_payload(&self) -> Result<String> {
        let Some(payload) = &self.payload else {
            return Ok(String::new());
        };
        let bytes = BASE64
            .decode(payload.as_bytes())
            .map_err(|e| AgentverseError::Serialization(format!("payload is not base64: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| AgentverseError::Serialization(format!("payload is not utf-8: {e}")))
    }

    /// SHA-256 over sender, target, session, schema digest, then the optional
    /// payload, expiry and nonce. Absent fields contribute nothing.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.sender.as_bytes());
        hasher.update(self.target.as_bytes());
        hasher.update(self.session.hyphenated().to_string().as_bytes());
        hasher.update(self.schema_digest.as_bytes());
        if let Some(payload) = &self.payload {
            hasher.update(payload.as_bytes());
        }
        if let Some(expires) = self.expires {
            hasher.update(expires.to_be_bytes());
        }
        if let Some(nonce) = self.nonce {
            hasher.update(nonce.to_be_bytes());
        }
        hasher.finalize().into()
    }

    pub fn sign(&mut self, identity: &dyn Identity) -> Result<()> {
        let signature = identity
            .sign_digest(&self.digest())
            .map_err(|e| AgentverseError::Signing(format!("failed to sign envelope: {e}")))?;
        self.signature = Some(signature);
        Ok(())
    }

    pub fn verify(&self) -> Result<bool> {
        self.verify_with::<AgentIdentity>()
    }

    pub fn verify_with<I: Identity>(&self) -> Result<bool> {
        let signature = self
            .signature
            .as_deref()
            .ok_or_else(|| AgentverseError::Config("envelope signature is missing".to_string()))?;
        Ok(I::verify_digest(&self.sender, &self.digest(), signature))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AgentverseError::Serialization(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let envelope: Self = serde_json::from_str(content)
            .map_err(|e| AgentverseError::Serialization(e.to_string()))?;
        if envelope.session.get_version_num() != 4 {
            return Err(AgentverseError::Serialization(format!(
                "session {} is not a version 4 uuid",
                envelope.session
            )));
        }
        Ok(envelope)
    }
}

pub fn parse_message(content: &str) -> Result<AgentMessage> {
    parse_message_with::<AgentIdentity>(content)
}

pub fn parse_message_with<I: Identity>(content: &str) -> Result<AgentMessage> {
    let envelope = Envelope::from_json(content)?;
    open_envelope::<I>(envelope)
}

pub(crate) fn open_envelope<I: Identity>(envelope: Envelope) -> Result<AgentMessage> {
    if !envelope.verify_with::<I>()? {
        return Err(AgentverseError::InvalidSignature(format!(
            "envelope from {} failed verification",
            envelope.sender
        )));
    }
    let json_payload = envelope.decode_payload()?;
    let payload = serde_json::from_str(&json_payload)
        .map_err(|e| AgentverseError::Serialization(format!("payload is not json: {e}")))?;
    Ok(AgentMessage {
        sender: envelope.sender,
        target: envelope.target,
        payload,
    })
}
