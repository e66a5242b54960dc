use std::sync::Arc;

/// Structured events produced while serving requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenEvent {
    Flattened {
        domain: Arc<str>,
        hops: usize,
        effective_ttl: u32,
    },
    Passthrough {
        domain: Arc<str>,
    },
    Fallback {
        domain: Arc<str>,
        reason: String,
    },
    UpstreamFailure {
        server: String,
        reason: String,
    },
}

/// Non-blocking observer. Implementations must not await.
pub trait FlattenEventSink: Send + Sync {
    fn emit(&self, event: FlattenEvent);
}
