use serde::Serialize;
use super::types::GatewayError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Hint for callers. The gateway itself never retries.
    pub retryable: bool,
}

/// Normalized kind of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamErrorKind {
    Network,
    UpstreamRejected,
    Protocol,
}

impl UpstreamErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::UpstreamRejected => "upstream-rejected",
            Self::Protocol => "protocol",
        }
    }
}

impl std::fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GatewayError {
    /// Classify this error to determine its type and whether a caller may retry it.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            GatewayError::Network { .. } => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            GatewayError::UpstreamRejected { status, .. } => ErrorClassification {
                error_type: "UpstreamRejectedError",
                retryable: *status == 429 || *status >= 500,
            },
            GatewayError::Protocol { .. } => ErrorClassification {
                error_type: "ProtocolError",
                retryable: false,
            },
            GatewayError::Config(_) => ErrorClassification {
                error_type: "ConfigurationError",
                retryable: false,
            },
            GatewayError::InvalidRequest(_) => ErrorClassification {
                error_type: "InvalidRequestError",
                retryable: false,
            },
            GatewayError::PolicyViolation { .. } => ErrorClassification {
                error_type: "PolicyViolation",
                retryable: false,
            },
            GatewayError::Moderation(_) => ErrorClassification {
                error_type: "ModerationFailure",
                retryable: false,
            },
            GatewayError::Cancelled => ErrorClassification {
                error_type: "Cancelled",
                retryable: false,
            },
            GatewayError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },
            GatewayError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            GatewayError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            GatewayError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: true,
            },
        }
    }

    /// Upstream kind for errors raised while talking to a provider.
    pub fn upstream_kind(&self) -> Option<UpstreamErrorKind> {
        match self {
            GatewayError::Network { .. } => Some(UpstreamErrorKind::Network),
            GatewayError::UpstreamRejected { .. } => Some(UpstreamErrorKind::UpstreamRejected),
            GatewayError::Protocol { .. } => Some(UpstreamErrorKind::Protocol),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_kind() {
        let err = GatewayError::network("openai", "connection refused");
        assert_eq!(err.upstream_kind(), Some(UpstreamErrorKind::Network));
        assert!(err.classify().retryable);
        assert_eq!(err.provider(), Some("openai"));
    }

    #[test]
    fn test_rate_limited_rejection_retryable() {
        let err = GatewayError::rejected("groq", 429, "slow down");
        let class = err.classify();
        assert!(class.retryable);
        assert_eq!(class.error_type, "UpstreamRejectedError");
    }

    #[test]
    fn test_auth_rejection_not_retryable() {
        let err = GatewayError::rejected("anthropic", 401, "invalid x-api-key");
        assert!(!err.classify().retryable);
        assert_eq!(err.upstream_kind(), Some(UpstreamErrorKind::UpstreamRejected));
    }

    #[test]
    fn test_protocol_error_not_retryable() {
        let err = GatewayError::protocol("google", "missing candidates");
        assert!(!err.classify().retryable);
        assert_eq!(err.upstream_kind().map(|k| k.as_str()), Some("protocol"));
    }

    #[test]
    fn test_config_error_is_not_upstream() {
        let err = GatewayError::Config("no credential for groq".into());
        assert_eq!(err.upstream_kind(), None);
        assert_eq!(err.provider(), None);
        assert_eq!(err.classify().error_type, "ConfigurationError");
    }
}
