//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating `camwatch.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid duration for `{field}`: {value:?}")]
    Duration { field: &'static str, value: String },

    #[error("no cameras configured")]
    NoCameras,

    #[error("camera #{0} has an empty name")]
    EmptyCameraName(usize),

    #[error("duplicate camera name: {0}")]
    DuplicateCamera(String),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
