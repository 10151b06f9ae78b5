use thiserror::Error;

/// Failure taxonomy for a single source operation. These never abort a run;
/// the dispatcher captures them into the owning source's outcome slot.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Response parse error: {message}")]
    ParseError { message: String },

    #[error("Blocked by source: {message}")]
    BlockedError { message: String },

    #[error("Timed out after {seconds}s")]
    TimeoutError { seconds: u64 },
}

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Profile is structurally invalid: {message}")]
    InvalidProfileError { message: String },

    #[error("No enabled sources to search")]
    EmptyRegistryError,
}

pub type Result<T> = std::result::Result<T, ScoutError>;
pub type SourceResult<T> = std::result::Result<T, SourceError>;
