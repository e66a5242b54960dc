mod availability;
mod health;
mod pool;

pub use availability::{availability_strategy, AvailabilityStrategy, ExpiringFlag, FailureThreshold};
pub use health::HealthProbe;
pub use pool::ForwarderPool;
