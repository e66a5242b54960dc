//! Ferrous Flatten Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod resolution_chain;

pub use config::{
    CliOverrides, Config, ConfigError, FlatteningConfig, FlatteningDirective, HealthCheckConfig,
    LoggingConfig, PipelineConfig, ServerConfig,
};
pub use dns_protocol::{UpstreamProtocol, UpstreamTarget, DEFAULT_EXPIRE};
pub use dns_query::{normalize_name, DnsQuery};
pub use dns_record::{RecordClass, RecordType};
pub use errors::DomainError;
pub use resolution_chain::{ChainHop, ResolutionChain};
