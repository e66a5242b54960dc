#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid cname_flattening directive: {0}")]
    Directive(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
