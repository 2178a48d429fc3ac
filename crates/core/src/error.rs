//! Error types for kv-core
//!
//! Provides a unified error type. Proxy operations absorb every variant
//! except configuration errors into an empty result (see [`crate::report`]).

use thiserror::Error;

/// Result type alias for kv-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kv-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (unknown region, missing bucket, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or empty object key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Backend answered with a non-success status
    #[error("Status code {status} for S3 request: {message}")]
    Status { status: u16, message: String },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Coarse failure classes used when reporting outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected locally before any network call
    Validation,
    /// Backend replied with a non-success status
    Status,
    /// Service or transport exception
    Transport,
    /// Fatal configuration problem, never absorbed
    Config,
}

impl Error {
    /// Classify the error for outcome reporting
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidKey(_) => ErrorKind::Validation,
            Error::Status { .. } | Error::Auth(_) | Error::NotFound(_) => ErrorKind::Status,
            Error::Config(_)
            | Error::TomlParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Config,
            Error::Network(_) | Error::Io(_) => ErrorKind::Transport,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Config => 2, // UsageError
            ErrorKind::Status | ErrorKind::Transport => 1,  // NoValue
        }
    }
}
