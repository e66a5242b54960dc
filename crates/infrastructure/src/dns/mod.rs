pub mod events;
pub mod forwarding;
pub mod server;
pub mod transport;
pub mod upstream;

pub use events::{FlattenEventEmitter, FlattenMetrics};
pub use server::{BufferedWriter, DnsServer};
pub use upstream::{
    availability_strategy, AvailabilityStrategy, ExpiringFlag, FailureThreshold, ForwarderPool,
    HealthProbe,
};
