use serde::Serialize;

use crate::config::Config;
use crate::domains::envelope::Envelope;
use crate::error::Result;
use crate::interfaces::identity::Identity;
use crate::services::almanac::{AgentRecord, AlmanacClient};
use crate::services::dispatcher::Dispatcher;
use crate::services::mailbox::MailboxClient;
use crate::services::registration::{Registration, RegistrationOutcome, RegistrationRequest};

pub struct AgentverseClient {
    config: Config,
    http: reqwest::Client,
    almanac: AlmanacClient,
    dispatcher: Dispatcher,
}

impl AgentverseClient {
    pub fn from_config(config: Config) -> Result<Self> {
        let http = config.http_client()?;
        let almanac = AlmanacClient::new(config.almanac_api_url.clone(), http.clone());
        let dispatcher = Dispatcher::new(almanac.clone(), http.clone());
        Ok(Self {
            config,
            http,
            almanac,
            dispatcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn mailbox(&self) -> Result<MailboxClient> {
        let token = self.config.token()?;
        Ok(MailboxClient::new(
            self.config.mailbox_api_url.clone(),
            token,
            self.http.clone(),
        ))
    }

    pub async fn register(
        &self,
        identity: &dyn Identity,
        request: &RegistrationRequest,
    ) -> Result<RegistrationOutcome> {
        let mailbox = self.mailbox()?;
        let mut registration = Registration::new(&self.almanac, &mailbox);
        registration.run(identity, request).await
    }

    pub async fn lookup(&self, address: &str) -> Result<AgentRecord> {
        self.almanac.get_agent(address).await
    }

    pub async fn lookup_endpoint(&self, address: &str) -> Result<String> {
        self.dispatcher.lookup_endpoint(address).await
    }

    pub async fn send<T: Serialize + ?Sized>(
        &self,
        sender: &dyn Identity,
        target: &str,
        protocol_digest: Option<&str>,
        schema_digest: &str,
        payload: &T,
    ) -> Result<Envelope> {
        self.dispatcher
            .send(sender, target, protocol_digest, schema_digest, payload)
            .await
    }
}
