use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsulUtilsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid search pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl ConsulUtilsError {
    /// Configuration problems are reported once and never retried.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Yaml(_) | Self::Regex(_))
    }
}

pub type Result<T> = std::result::Result<T, ConsulUtilsError>;
