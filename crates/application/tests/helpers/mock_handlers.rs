use super::messages::reply_to;
use async_trait::async_trait;
use ferrous_flatten_application::ports::{
    DnsHandler, FlattenEvent, FlattenEventSink, RequestContext, ResponseWriter, ServeError,
};
use ferrous_flatten_domain::DomainError;
use hickory_proto::op::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Next handler that answers every request with the same template, writes
/// nothing, or fails.
pub struct StaticHandler {
    reply: Option<Message>,
    error: Option<DomainError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Message>>,
}

impl StaticHandler {
    pub fn replying(template: Message) -> Self {
        Self {
            reply: Some(template),
            error: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self {
            reply: None,
            error: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            error: Some(error),
            ..Self::silent()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_requests(&self) -> Vec<Message> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsHandler for StaticHandler {
    async fn serve_dns(
        &self,
        _ctx: &RequestContext,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), ServeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());

        if let Some(error) = &self.error {
            return Err(ServeError::new(error.clone()));
        }
        if let Some(template) = &self.reply {
            writer.write_msg(&reply_to(request, template)).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    pub written: Vec<Message>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&self) -> &Message {
        assert_eq!(self.written.len(), 1, "expected exactly one written message");
        &self.written[0]
    }
}

#[async_trait]
impl ResponseWriter for RecordingWriter {
    async fn write_msg(&mut self, message: &Message) -> Result<(), DomainError> {
        self.written.push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockEventSink {
    events: Mutex<Vec<FlattenEvent>>,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FlattenEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl FlattenEventSink for MockEventSink {
    fn emit(&self, event: FlattenEvent) {
        self.events.lock().unwrap().push(event);
    }
}
