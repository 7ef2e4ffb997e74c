use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentverseError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("signing error: {0}")]
    Signing(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
}

impl AgentverseError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, url: &str, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("{url} returned HTTP {status}")
        } else {
            format!("{url} returned HTTP {status}: {}", body.trim())
        };
        Self::Transport {
            status: Some(status),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for AgentverseError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentverseError>;
