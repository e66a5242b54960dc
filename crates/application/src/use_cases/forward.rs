use crate::ports::{
    DnsHandler, FlattenEventSink, RequestContext, ResponseWriter, ServeError, UpstreamForwarder,
};
use crate::services::forward_with_failover;
use async_trait::async_trait;
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::debug;

/// Terminal pipeline handler: sends the request to an upstream pool and
/// writes whatever comes back.
pub struct ForwardHandler {
    forwarder: Arc<dyn UpstreamForwarder>,
    events: Option<Arc<dyn FlattenEventSink>>,
}

impl ForwardHandler {
    pub fn new(forwarder: Arc<dyn UpstreamForwarder>) -> Self {
        Self {
            forwarder,
            events: None,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn FlattenEventSink>) -> Self {
        self.events = Some(events);
        self
    }
}

#[async_trait]
impl DnsHandler for ForwardHandler {
    async fn serve_dns(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), ServeError> {
        let reply = ctx
            .run(forward_with_failover(
                self.forwarder.as_ref(),
                request,
                self.events.as_deref(),
            ))
            .await?;

        debug!(
            id = request.id(),
            answers = reply.answers().len(),
            "Forwarded request"
        );
        writer.write_msg(&reply).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "forward"
    }
}
