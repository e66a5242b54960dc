use async_trait::async_trait;
use ferrous_flatten_domain::{DomainError, UpstreamTarget};
use hickory_proto::op::Message;

/// A read-only pool of upstream resolvers.
///
/// One `query_target` call is one attempt against one target. Choosing the
/// next target after a failure is the caller's job (see
/// [`forward_with_failover`](crate::services::forward_with_failover)).
#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    fn targets(&self) -> &[UpstreamTarget];

    /// `false` while the target is flagged by a recent failure.
    fn is_available(&self, index: usize) -> bool;

    /// Send `request` to the target at `index`.
    ///
    /// Timeouts and socket errors are `Unreachable`; a reply that does not
    /// match the request is `MalformedReply`.
    async fn query_target(&self, index: usize, request: &Message) -> Result<Message, DomainError>;
}
