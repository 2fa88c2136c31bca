use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("image for toast #{index} ({src}) did not load within {}", humantime::format_duration(*after))]
    ImageTimeout {
        index: usize,
        src: Url,
        after: Duration,
    },
    #[error("controller is busy with another init or update")]
    Busy,
    #[error("init was cancelled by destroy")]
    Cancelled,
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("stylesheet rejected rule: {rule}")]
    RuleRejected { rule: String },
    #[error("unknown stylesheet handle")]
    UnknownStyle,
    #[error("image failed to load: {src}")]
    ImageLoad { src: Url },
}

impl Error {
    /// Whether retrying the same `init` may succeed (slow or flaky image hosts).
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::ImageTimeout { .. }
                | Self::Host(HostError::ImageLoad { .. })
                | Self::Busy
                | Self::Cancelled
        )
    }
}
