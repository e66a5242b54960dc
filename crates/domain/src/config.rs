//! Configuration module for Ferrous Flatten
//!
//! - `root`: Main configuration and CLI overrides
//! - `server`: Listener binding and request deadline
//! - `flattening`: Chain depth bound and flattening upstreams
//! - `directive`: Single-line `cname_flattening` directive
//! - `pipeline`: Upstreams for the forwarding handler
//! - `health`: Health probe of flagged upstreams
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod directive;
pub mod errors;
pub mod flattening;
pub mod health;
pub mod logging;
pub mod pipeline;
pub mod root;
pub mod server;

pub use directive::FlatteningDirective;
pub use errors::ConfigError;
pub use flattening::{AvailabilityMode, FlatteningConfig, MAX_EXPIRE_SECS};
pub use health::HealthCheckConfig;
pub use logging::LoggingConfig;
pub use pipeline::PipelineConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
