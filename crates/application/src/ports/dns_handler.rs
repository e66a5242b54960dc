use super::{RequestContext, ResponseWriter};
use async_trait::async_trait;
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;

/// Status reported when the next handler wrote nothing.
pub const STATUS_NO_ANSWER: u16 = 1;

/// Status reported for every other failure; matches the DNS SERVFAIL code.
pub const STATUS_SERVFAIL: u16 = 2;

/// A handler failure as seen by the hosting pipeline.
///
/// `Ok(())` from [`DnsHandler::serve_dns`] means a message was written
/// (status 0). An error always carries a non-zero status and means this
/// handler wrote nothing; the pipeline's own failure handling takes over.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status {status}: {error}")]
pub struct ServeError {
    pub status: u16,
    pub error: DomainError,
}

impl ServeError {
    pub fn new(error: DomainError) -> Self {
        let status = match error {
            DomainError::NoAnswerCaptured => STATUS_NO_ANSWER,
            _ => STATUS_SERVFAIL,
        };
        Self { status, error }
    }
}

impl From<DomainError> for ServeError {
    fn from(error: DomainError) -> Self {
        Self::new(error)
    }
}

#[async_trait]
pub trait DnsHandler: Send + Sync {
    /// Answer `request` by writing at most one message to `writer`.
    async fn serve_dns(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), ServeError>;

    fn name(&self) -> &'static str;
}
