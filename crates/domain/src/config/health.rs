use serde::{Deserialize, Serialize};

/// Background probing of targets currently flagged unavailable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between two probe rounds.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    30
}
