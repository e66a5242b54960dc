use serde::{Deserialize, Serialize};

use super::directive::FlatteningDirective;
use super::errors::ConfigError;
use super::flattening::FlatteningConfig;
use super::health::HealthCheckConfig;
use super::logging::LoggingConfig;
use super::pipeline::PipelineConfig;
use super::server::ServerConfig;

/// Main configuration structure for Ferrous Flatten
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (port, bind address, request deadline)
    #[serde(default)]
    pub server: ServerConfig,

    /// CNAME flattening: depth bound and the upstreams used for each hop
    #[serde(default)]
    pub flattening: FlatteningConfig,

    /// Forwarding handler placed after flattening in the pipeline
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub health_check: HealthCheckConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-flatten.toml in current directory
    /// 3. /etc/ferrous-flatten/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-flatten.toml").exists() {
            Self::from_file("ferrous-flatten.toml")?
        } else if std::path::Path::new("/etc/ferrous-flatten/config.toml").exists() {
            Self::from_file("/etc/ferrous-flatten/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides)?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(line) = overrides.directive {
            let directive: FlatteningDirective = line.parse()?;
            self.flattening = directive.apply_to(self.flattening.clone());
        }
        if let Some(depth) = overrides.max_depth {
            self.flattening.max_depth = depth;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if self.server.request_timeout == 0 {
            return Err(ConfigError::Validation(
                "server.request_timeout cannot be 0".to_string(),
            ));
        }

        self.flattening.validate()?;
        self.pipeline.validate()?;

        if self.health_check.enabled && self.health_check.interval == 0 {
            return Err(ConfigError::Validation(
                "health_check.interval cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    pub max_depth: Option<usize>,
    /// `max_depth <N> <upstream>...`, replacing the flattening upstreams
    pub directive: Option<String>,
}
