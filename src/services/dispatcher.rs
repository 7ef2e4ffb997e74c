use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, info};

use crate::domains::envelope::Envelope;
use crate::error::{AgentverseError, Result};
use crate::interfaces::identity::Identity;
use crate::services::almanac::AlmanacClient;
use crate::services::http::ensure_success;

#[derive(Clone)]
pub struct Dispatcher {
    almanac: AlmanacClient,
    http: reqwest::Client,
}

impl Dispatcher {
    pub fn new(almanac: AlmanacClient, http: reqwest::Client) -> Self {
        Self { almanac, http }
    }

    pub async fn lookup_endpoint(&self, address: &str) -> Result<String> {
        self.almanac.lookup_endpoint(address).await
    }

    pub async fn send<T: Serialize + ?Sized>(
        &self,
        sender: &dyn Identity,
        target: &str,
        protocol_digest: Option<&str>,
        schema_digest: &str,
        payload: &T,
    ) -> Result<Envelope> {
        let json_payload = serde_json::to_string(payload)
            .map_err(|e| AgentverseError::Serialization(e.to_string()))?;

        let mut envelope = Envelope::new(
            sender.address(),
            target,
            schema_digest,
            protocol_digest.map(str::to_string),
        );
        envelope.encode_payload(&json_payload);
        envelope.sign(sender)?;

        let endpoint = self.lookup_endpoint(target).await?;
        self.deliver(&endpoint, &envelope).await?;
        info!(target = %target, session = %envelope.session, "envelope delivered");
        Ok(envelope)
    }

    pub async fn deliver(&self, endpoint: &str, envelope: &Envelope) -> Result<()> {
        debug!(endpoint = %endpoint, session = %envelope.session, "posting envelope");
        let body = envelope.to_json()?;
        let response = self
            .http
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}
