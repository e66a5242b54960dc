use crate::ports::{FlattenEvent, FlattenEventSink, UpstreamForwarder};
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;
use tracing::{debug, warn};

/// Try targets in configured order until one returns a valid reply.
///
/// Targets flagged unavailable are skipped. When every target is flagged,
/// one pass is made over all of them anyway. `Unreachable` and
/// `MalformedReply` move on to the next target; any other error ends the
/// walk immediately.
pub async fn forward_with_failover(
    forwarder: &dyn UpstreamForwarder,
    request: &Message,
    events: Option<&dyn FlattenEventSink>,
) -> Result<Message, DomainError> {
    let targets = forwarder.targets();
    if targets.is_empty() {
        return Err(DomainError::AllTargetsUnreachable);
    }

    let mut order: Vec<usize> = (0..targets.len())
        .filter(|&index| forwarder.is_available(index))
        .collect();
    if order.is_empty() {
        warn!(
            targets = targets.len(),
            "Every upstream flagged unavailable, trying all"
        );
        order = (0..targets.len()).collect();
    }

    let attempted = order.len();
    let mut unreachable = 0usize;
    let mut last_error = None;

    for (position, index) in order.into_iter().enumerate() {
        let target = &targets[index];
        match forwarder.query_target(index, request).await {
            Ok(reply) => {
                debug!(server = %target, position, "Upstream responded");
                return Ok(reply);
            }
            Err(e) if e.is_transport_error() => {
                warn!(server = %target, error = %e, position, "Failing over");
                if let Some(sink) = events {
                    sink.emit(FlattenEvent::UpstreamFailure {
                        server: target.label(),
                        reason: e.to_string(),
                    });
                }
                if matches!(e, DomainError::Unreachable { .. }) {
                    unreachable += 1;
                }
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    if unreachable == attempted {
        return Err(DomainError::AllTargetsUnreachable);
    }
    Err(last_error.unwrap_or(DomainError::AllTargetsUnreachable))
}
