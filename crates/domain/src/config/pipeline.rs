use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use super::flattening::parse_targets;
use crate::dns_protocol::{UpstreamTarget, DEFAULT_EXPIRE};

/// Upstreams used by the forwarding handler that sits after flattening
/// in the standalone server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_upstreams")]
    pub upstreams: Vec<String>,

    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upstreams: default_upstreams(),
            attempt_timeout: default_attempt_timeout(),
        }
    }
}

fn default_upstreams() -> Vec<String> {
    vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()]
}

fn default_attempt_timeout() -> u64 {
    2000
}

impl PipelineConfig {
    pub fn targets(&self) -> Result<Vec<UpstreamTarget>, ConfigError> {
        parse_targets(
            &self.upstreams,
            DEFAULT_EXPIRE,
            Duration::from_millis(self.attempt_timeout),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstreams.is_empty() {
            return Err(ConfigError::Validation(
                "pipeline.upstreams must list at least one server".to_string(),
            ));
        }
        if self.attempt_timeout == 0 {
            return Err(ConfigError::Validation(
                "pipeline.attempt_timeout cannot be 0".to_string(),
            ));
        }
        self.targets().map(|_| ())
    }
}
