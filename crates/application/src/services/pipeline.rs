use crate::ports::{DnsHandler, RequestContext, ResponseWriter, ServeError};
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;

/// Hand the request to `next`, or fail when `current` is last in the chain.
pub async fn next_or_failure(
    current: &'static str,
    next: Option<&dyn DnsHandler>,
    ctx: &RequestContext,
    writer: &mut dyn ResponseWriter,
    request: &Message,
) -> Result<(), ServeError> {
    match next {
        Some(handler) => handler.serve_dns(ctx, writer, request).await,
        None => Err(ServeError::new(DomainError::NoNextHandler(current))),
    }
}
