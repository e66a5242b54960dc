use std::str::FromStr;

use super::errors::ConfigError;
use super::flattening::FlatteningConfig;

/// The one-line plugin form: `max_depth <N> <upstream> [<upstream>...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatteningDirective {
    pub max_depth: usize,
    pub upstreams: Vec<String>,
}

impl FlatteningDirective {
    /// Apply onto an existing section, keeping its timeouts and availability mode.
    pub fn apply_to(self, mut config: FlatteningConfig) -> FlatteningConfig {
        config.max_depth = self.max_depth;
        config.upstreams = self.upstreams;
        config
    }
}

impl FromStr for FlatteningDirective {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let args: Vec<&str> = s.split_whitespace().collect();

        let Some(keyword) = args.first() else {
            return Err(ConfigError::Directive(
                "expected 'max_depth <N> <upstream>...'".to_string(),
            ));
        };

        if !keyword.eq_ignore_ascii_case("max_depth") {
            return Err(ConfigError::Directive(format!(
                "unsupported parameter {} for upstream setting",
                keyword
            )));
        }

        let depth_arg = args.get(1).ok_or_else(|| {
            ConfigError::Directive("max_depth requires a value".to_string())
        })?;
        let max_depth = depth_arg.parse::<usize>().map_err(|e| {
            ConfigError::Directive(format!("invalid max_depth '{}': {}", depth_arg, e))
        })?;
        if max_depth == 0 {
            return Err(ConfigError::Validation(
                "max_depth must be a positive integer".to_string(),
            ));
        }

        let upstreams: Vec<String> = args[2..].iter().map(|a| a.to_string()).collect();
        if upstreams.is_empty() {
            return Err(ConfigError::Directive(
                "at least one upstream is required after max_depth".to_string(),
            ));
        }

        Ok(Self {
            max_depth,
            upstreams,
        })
    }
}
