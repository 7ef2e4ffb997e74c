//! Multi-step registration of an agent with the Almanac and the mailbox
//! metadata service.
//!
//! Steps run strictly in order and stop at the first failure. Nothing is
//! rolled back: the Almanac upsert is keyed by address, so re-running the
//! whole registration resumes cleanly.

use std::fmt;

use tracing::{info, warn};

use crate::domains::attestation::{AgentEndpoint, AgentRegistrationAttestation};
use crate::error::Result;
use crate::interfaces::identity::Identity;
use crate::services::almanac::AlmanacClient;
use crate::services::mailbox::MailboxClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Unregistered,
    AttestationSubmitted,
    DirectoryChecked,
    DirectoryCreated,
    DirectorySkipped,
    MetadataUpdated,
    /// Terminal failure; carries the last state reached before the failing step.
    Failed(FailedAt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedAt {
    Unregistered,
    AttestationSubmitted,
    DirectoryChecked,
    DirectoryCreated,
    DirectorySkipped,
}

impl RegistrationState {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationState::Unregistered => "unregistered",
            RegistrationState::AttestationSubmitted => "attestation_submitted",
            RegistrationState::DirectoryChecked => "directory_checked",
            RegistrationState::DirectoryCreated => "directory_created",
            RegistrationState::DirectorySkipped => "directory_skipped",
            RegistrationState::MetadataUpdated => "metadata_updated",
            RegistrationState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RegistrationState::MetadataUpdated | RegistrationState::Failed(_)
        )
    }

    fn failed(self) -> Self {
        let at = match self {
            RegistrationState::Unregistered => FailedAt::Unregistered,
            RegistrationState::AttestationSubmitted => FailedAt::AttestationSubmitted,
            RegistrationState::DirectoryChecked => FailedAt::DirectoryChecked,
            RegistrationState::DirectoryCreated => FailedAt::DirectoryCreated,
            RegistrationState::DirectorySkipped => FailedAt::DirectorySkipped,
            terminal => return terminal,
        };
        RegistrationState::Failed(at)
    }
}

impl fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub endpoint_url: String,
    pub protocol_digest: String,
    pub name: String,
    pub readme: String,
}

#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub address: String,
    pub attestation: AgentRegistrationAttestation,
    pub created: bool,
    pub history: Vec<RegistrationState>,
}

pub struct Registration<'a> {
    almanac: &'a AlmanacClient,
    mailbox: &'a MailboxClient,
    state: RegistrationState,
    history: Vec<RegistrationState>,
}

impl<'a> Registration<'a> {
    pub fn new(almanac: &'a AlmanacClient, mailbox: &'a MailboxClient) -> Self {
        Self {
            almanac,
            mailbox,
            state: RegistrationState::Unregistered,
            history: vec![RegistrationState::Unregistered],
        }
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn history(&self) -> &[RegistrationState] {
        &self.history
    }

    fn transition(&mut self, next: RegistrationState) {
        info!(from = %self.state, to = %next, "registration transition");
        self.state = next;
        self.history.push(next);
    }

    pub async fn run(
        &mut self,
        identity: &dyn Identity,
        request: &RegistrationRequest,
    ) -> Result<RegistrationOutcome> {
        match self.steps(identity, request).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(state = %self.state, error = %err, "registration failed");
                let failed = self.state.failed();
                self.transition(failed);
                Err(err)
            }
        }
    }

    async fn steps(
        &mut self,
        identity: &dyn Identity,
        request: &RegistrationRequest,
    ) -> Result<RegistrationOutcome> {
        let address = identity.address().to_string();

        let mut attestation = AgentRegistrationAttestation::new(
            address.clone(),
            vec![request.protocol_digest.clone()],
            vec![AgentEndpoint::new(request.endpoint_url.clone())],
        );
        attestation.sign(identity)?;
        self.almanac.submit_attestation(&attestation).await?;
        self.transition(RegistrationState::AttestationSubmitted);

        let existing = self.mailbox.get_agent(&address).await?;
        self.transition(RegistrationState::DirectoryChecked);

        let created = match existing {
            Some(_) => {
                self.transition(RegistrationState::DirectorySkipped);
                false
            }
            None => {
                self.mailbox.create_agent(&address, &request.name).await?;
                self.transition(RegistrationState::DirectoryCreated);
                true
            }
        };

        self.mailbox
            .update_agent(&address, &request.name, &request.readme)
            .await?;
        self.transition(RegistrationState::MetadataUpdated);

        Ok(RegistrationOutcome {
            address,
            attestation,
            created,
            history: self.history.clone(),
        })
    }
}
