use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentverseError, Result};
use crate::services::http::{address_path, ensure_success, join_url};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxAgent {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateAgentRequest<'a> {
    address: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateAgentRequest<'a> {
    name: &'a str,
    readme: &'a str,
}

#[derive(Clone)]
pub struct MailboxClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl MailboxClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            http,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
    }

    /// `Ok(None)` when the service has no record for `address`.
    pub async fn get_agent(&self, address: &str) -> Result<Option<MailboxAgent>> {
        let url = join_url(&self.base_url, &address_path(address));
        debug!(url = %url, "checking mailbox record");
        let response = self.authorized(self.http.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let text = response.text().await?;
        // Some deployments answer 200 with an empty body.
        if text.trim().is_empty() {
            return Ok(Some(MailboxAgent {
                address: address.to_string(),
                name: None,
                readme: None,
            }));
        }
        let agent = serde_json::from_str(&text)
            .map_err(|e| AgentverseError::Serialization(e.to_string()))?;
        Ok(Some(agent))
    }

    pub async fn create_agent(&self, address: &str, name: &str) -> Result<()> {
        let url = join_url(&self.base_url, "");
        debug!(url = %url, address = %address, "creating mailbox record");
        let body = CreateAgentRequest { address, name };
        let response = self.authorized(self.http.post(&url)).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn update_agent(&self, address: &str, name: &str, readme: &str) -> Result<()> {
        let url = join_url(&self.base_url, &address_path(address));
        debug!(url = %url, "updating mailbox metadata");
        let body = UpdateAgentRequest { name, readme };
        let response = self.authorized(self.http.put(&url)).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
