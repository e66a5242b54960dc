#![allow(dead_code)]
#![allow(unused_imports)]

mod messages;
mod mock_forwarder;
mod mock_handlers;

pub use messages::*;
pub use mock_forwarder::MockForwarder;
pub use mock_handlers::{MockEventSink, RecordingWriter, StaticHandler};
