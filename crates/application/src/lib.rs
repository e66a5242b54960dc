//! Ferrous Flatten Application Layer
//!
//! Ports describe the pipeline surface and the upstream forwarder; services
//! hold the alias chain engine and its helpers; use cases are the handlers
//! placed into a pipeline.

pub mod ports;
pub mod services;
pub mod use_cases;
