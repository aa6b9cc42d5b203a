use thiserror::Error;
use crate::moderation::ModerationVerdict;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error talking to {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("{provider} rejected the request with status {status}: {message}")]
    UpstreamRejected {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Malformed response from {provider}: {message}")]
    Protocol { provider: String, message: String },

    #[error("Content policy violation: {message}")]
    PolicyViolation {
        verdict: Box<ModerationVerdict>,
        message: String,
    },

    #[error("Moderation failure: {0}")]
    Moderation(String),

    #[error("Stream cancelled by caller")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn network(provider: &str, message: impl Into<String>) -> Self {
        Self::Network { provider: provider.to_string(), message: message.into() }
    }

    pub fn rejected(provider: &str, status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamRejected { provider: provider.to_string(), status, message: message.into() }
    }

    pub fn protocol(provider: &str, message: impl Into<String>) -> Self {
        Self::Protocol { provider: provider.to_string(), message: message.into() }
    }

    /// Provider id carried by upstream errors.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Network { provider, .. }
            | Self::UpstreamRejected { provider, .. }
            | Self::Protocol { provider, .. } => Some(provider),
            _ => None,
        }
    }
}
