mod dns_handler;
mod flatten_event_sink;
mod request_context;
mod response_writer;
mod upstream_forwarder;

pub use dns_handler::{DnsHandler, ServeError, STATUS_NO_ANSWER, STATUS_SERVFAIL};
pub use flatten_event_sink::{FlattenEvent, FlattenEventSink};
pub use request_context::RequestContext;
pub use response_writer::ResponseWriter;
pub use upstream_forwarder::UpstreamForwarder;

// Re-export for convenience
pub use ferrous_flatten_domain::DnsQuery;
