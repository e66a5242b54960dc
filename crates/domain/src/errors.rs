use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("No answer received from next handler")]
    NoAnswerCaptured,

    #[error("Response already written for this request")]
    DuplicateResponse,

    #[error("No next handler configured after {0}")]
    NoNextHandler(&'static str),

    #[error("Failed to write response: {0}")]
    WriteFailed(String),

    #[error("Upstream {server} unreachable: {reason}")]
    Unreachable { server: String, reason: String },

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("CNAME cycle detected at {name}")]
    CycleDetected { name: String },

    #[error("CNAME chain exceeds max depth {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("CNAME chain resolution failed: {0}")]
    ChainResolutionFailed(String),

    #[error("All upstream servers are unreachable")]
    AllTargetsUnreachable,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Errors that are local to one upstream target; the caller may try the next one.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::Unreachable { .. } | DomainError::MalformedReply(_)
        )
    }

    /// Chain-level failures after which the original query is forwarded unresolved.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            DomainError::CycleDetected { .. }
                | DomainError::DepthExceeded { .. }
                | DomainError::ChainResolutionFailed(_)
        )
    }
}
