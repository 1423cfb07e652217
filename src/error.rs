//! Error types for the libris client.
//!
//! Uses `thiserror` for structured error definitions. The API error is
//! deliberately flat: every failure cause for a given call collapses into
//! one generic variant, so callers render a single message per operation and
//! never branch on status codes.

use thiserror::Error;

/// Error type for backend API operations.
///
/// The payload is the operation name ("fetch books", "create reading list",
/// ...). Transport failures, non-2xx statuses, and undecodable bodies all
/// map here; the underlying cause is logged at the call site before being
/// collapsed.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The named operation failed.
    #[error("failed to {0}")]
    Request(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
