/// Centralized error types for docprep using thiserror
///
/// Configuration problems are reported eagerly at construction time; the
/// chunker itself never fails once it has been built.
use thiserror::Error;

/// Main error type for the preparation pipeline
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cleaning error: {0}")]
    Clean(#[from] CleanError),

    #[error("Refine error: {0}")]
    Refine(#[from] RefineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while building a Markdown splitter
#[derive(Error, Debug)]
pub enum ChunkingError {
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("Invalid header marker '{marker}': {reason}")]
    InvalidHeaderMarker { marker: String, reason: String },

    #[error("Invalid separator '{separator}': {reason}")]
    InvalidSeparator { separator: String, reason: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to boilerplate cleanup
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Invalid cleanup pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors from the LLM cleanup pass
#[derive(Error, Debug)]
pub enum RefineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned error status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("API key environment variable '{0}' is not set")]
    MissingApiKey(String),
}

impl From<anyhow::Error> for PrepError {
    fn from(err: anyhow::Error) -> Self {
        PrepError::Other(format!("{:#}", err))
    }
}

impl PrepError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        PrepError::Other(msg.into())
    }

    /// Check if this is a user error (bad configuration) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PrepError::Chunking(_)
                | PrepError::Clean(_)
                | PrepError::Config(ConfigError::InvalidValue { .. })
                | PrepError::Refine(RefineError::MissingApiKey(_))
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PrepError::Refine(RefineError::Http(_)) | PrepError::Io(_) => true,
            PrepError::Refine(RefineError::Api { status, .. }) => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}
