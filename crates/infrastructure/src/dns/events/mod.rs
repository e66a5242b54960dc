mod emitter;
mod metrics;

pub use emitter::FlattenEventEmitter;
pub use metrics::FlattenMetrics;
