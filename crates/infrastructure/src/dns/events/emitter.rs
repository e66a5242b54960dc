use ferrous_flatten_application::ports::{FlattenEvent, FlattenEventSink};
use tokio::sync::mpsc;

/// Event sink backed by an unbounded channel. The disabled variant drops
/// every event without allocating.
#[derive(Clone)]
pub struct FlattenEventEmitter {
    sender: Option<mpsc::UnboundedSender<FlattenEvent>>,
}

impl FlattenEventEmitter {
    pub fn new_disabled() -> Self {
        Self { sender: None }
    }

    pub fn new_enabled() -> (Self, mpsc::UnboundedReceiver<FlattenEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self { sender: Some(tx) };
        (emitter, rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl FlattenEventSink for FlattenEventEmitter {
    fn emit(&self, event: FlattenEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }
}

impl Default for FlattenEventEmitter {
    fn default() -> Self {
        Self::new_disabled()
    }
}

impl std::fmt::Debug for FlattenEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlattenEventEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
