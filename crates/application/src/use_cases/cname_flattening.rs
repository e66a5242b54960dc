use crate::ports::{
    DnsHandler, FlattenEvent, FlattenEventSink, RequestContext, ResponseWriter, ServeError,
    UpstreamForwarder,
};
use crate::services::{
    build_flattened_response, extract_question, forward_with_failover, is_alias_response,
    next_or_failure, ChainFlattener, ResponseInterceptor,
};
use async_trait::async_trait;
use ferrous_flatten_domain::{DnsQuery, DomainError};
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::{debug, info, warn};

const NAME: &str = "cname_flattening";

/// Middleware that resolves alias answers on the client's behalf.
///
/// The next handler answers a copy of the request into a
/// [`ResponseInterceptor`]. A non-alias answer is written through untouched.
/// An alias answer is flattened; when flattening fails on a cycle, a depth
/// overrun or a broken hop, the untouched original request is forwarded
/// once through the flattening pool instead.
pub struct CnameFlatteningHandler {
    next: Option<Arc<dyn DnsHandler>>,
    forwarder: Arc<dyn UpstreamForwarder>,
    flattener: ChainFlattener,
    events: Option<Arc<dyn FlattenEventSink>>,
}

impl CnameFlatteningHandler {
    pub fn new(forwarder: Arc<dyn UpstreamForwarder>, max_depth: usize) -> Self {
        Self {
            next: None,
            flattener: ChainFlattener::new(Arc::clone(&forwarder), max_depth),
            forwarder,
            events: None,
        }
    }

    pub fn with_next(mut self, next: Arc<dyn DnsHandler>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn FlattenEventSink>) -> Self {
        self.flattener = self.flattener.with_event_sink(Arc::clone(&events));
        self.events = Some(events);
        self
    }

    fn emit(&self, event: FlattenEvent) {
        if let Some(sink) = &self.events {
            sink.emit(event);
        }
    }

    async fn fallback(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        request: &Message,
        query: &DnsQuery,
        reason: DomainError,
    ) -> Result<(), ServeError> {
        info!(domain = %query.domain, reason = %reason, "Forwarding original request unflattened");
        self.emit(FlattenEvent::Fallback {
            domain: Arc::clone(&query.domain),
            reason: reason.to_string(),
        });

        let reply = ctx
            .run(forward_with_failover(
                self.forwarder.as_ref(),
                request,
                self.events.as_deref(),
            ))
            .await?;

        writer.write_msg(&reply).await?;
        Ok(())
    }
}

#[async_trait]
impl DnsHandler for CnameFlatteningHandler {
    async fn serve_dns(
        &self,
        ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), ServeError> {
        let next = self.next.as_deref();

        let Some(query) = extract_question(request).filter(|q| q.record_type.is_flattenable())
        else {
            debug!(id = request.id(), "Request not eligible for flattening");
            return next_or_failure(NAME, next, ctx, writer, request).await;
        };

        let copy = request.clone();
        let mut interceptor = ResponseInterceptor::new();
        next_or_failure(NAME, next, ctx, &mut interceptor, &copy).await?;

        let Some(captured) = interceptor.into_captured() else {
            warn!(domain = %query.domain, "No answer received from next handler");
            return Err(ServeError::new(DomainError::NoAnswerCaptured));
        };

        if !is_alias_response(&captured, &query) {
            debug!(domain = %query.domain, "Answer is not an alias");
            self.emit(FlattenEvent::Passthrough {
                domain: Arc::clone(&query.domain),
            });
            writer.write_msg(&captured).await?;
            return Ok(());
        }

        match self.flattener.flatten(ctx, &query, &captured).await {
            Ok(outcome) => {
                let response = build_flattened_response(request, &outcome.result);
                self.emit(FlattenEvent::Flattened {
                    domain: Arc::clone(&query.domain),
                    hops: outcome.chain.len(),
                    effective_ttl: outcome.result.effective_ttl,
                });
                writer.write_msg(&response).await?;
                Ok(())
            }
            Err(e) if e.allows_fallback() => {
                self.fallback(ctx, writer, request, &query, e).await
            }
            Err(e) => Err(ServeError::new(e)),
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
