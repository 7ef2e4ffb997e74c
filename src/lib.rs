pub mod client;
pub mod config;
pub mod domains;
pub mod error;
pub mod identity;
pub mod interfaces;
pub mod services;

pub use crate::client::AgentverseClient;
pub use crate::config::Config;
pub use crate::domains::attestation::{AgentEndpoint, AgentRegistrationAttestation};
pub use crate::domains::envelope::{parse_message, Envelope};
pub use crate::domains::message::AgentMessage;
pub use crate::error::{AgentverseError, Result};
pub use crate::identity::AgentIdentity;
pub use crate::interfaces::identity::Identity;
