use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use crate::dns_protocol::UpstreamTarget;

/// Upper bound for `expire`, in seconds (one day).
pub const MAX_EXPIRE_SECS: u64 = 86_400;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlatteningConfig {
    /// Maximum number of alias hops followed for one request.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Upstreams queried for each hop and for the unflattened fallback.
    #[serde(default)]
    pub upstreams: Vec<String>,

    /// Seconds a failed target stays unavailable.
    #[serde(default = "default_expire")]
    pub expire: u64,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout: u64,

    #[serde(default)]
    pub availability: AvailabilityMode,

    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u8,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityMode {
    /// One failure flags the target for its expiry window.
    #[default]
    Flag,

    /// `failure_threshold` consecutive failures flag the target.
    Threshold,
}

impl Default for FlatteningConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            upstreams: vec![],
            expire: default_expire(),
            attempt_timeout: default_attempt_timeout(),
            availability: AvailabilityMode::default(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

impl FlatteningConfig {
    /// Parse every configured upstream into a target carrying this section's
    /// expiry window and attempt timeout.
    pub fn targets(&self) -> Result<Vec<UpstreamTarget>, ConfigError> {
        parse_targets(
            &self.upstreams,
            Duration::from_secs(self.expire),
            Duration::from_millis(self.attempt_timeout),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Validation(
                "flattening.max_depth must be a positive integer".to_string(),
            ));
        }
        if self.upstreams.is_empty() {
            return Err(ConfigError::Validation(
                "flattening.upstreams must list at least one server".to_string(),
            ));
        }
        if self.attempt_timeout == 0 {
            return Err(ConfigError::Validation(
                "flattening.attempt_timeout cannot be 0".to_string(),
            ));
        }
        if self.expire > MAX_EXPIRE_SECS {
            return Err(ConfigError::Validation(format!(
                "flattening.expire must be at most {} seconds, got {}",
                MAX_EXPIRE_SECS, self.expire
            )));
        }
        if self.availability == AvailabilityMode::Threshold && self.failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "flattening.failure_threshold cannot be 0".to_string(),
            ));
        }
        self.targets().map(|_| ())
    }
}

pub(crate) fn parse_targets(
    upstreams: &[String],
    expire: Duration,
    attempt_timeout: Duration,
) -> Result<Vec<UpstreamTarget>, ConfigError> {
    upstreams
        .iter()
        .map(|s| {
            s.parse::<UpstreamTarget>()
                .map(|t| t.with_expire(expire).with_attempt_timeout(attempt_timeout))
                .map_err(|e| ConfigError::Validation(e.to_string()))
        })
        .collect()
}

fn default_max_depth() -> usize {
    8
}

fn default_expire() -> u64 {
    10
}

fn default_attempt_timeout() -> u64 {
    2000
}

fn default_failure_threshold() -> u8 {
    3
}
