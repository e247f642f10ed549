//! Error handling for the yawns foundational layer.
//!
//! The main error type for this crate is [`CoreError`], which wraps the more
//! specific [`ConfigError`]. Higher layers (the notification engine, the bus
//! frontend) define their own error enums and convert where they touch this
//! crate.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the yawns daemon.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors that occur during the initialization of the logging system.
    #[error("logging initialization failed: {0}")]
    LoggingInitialization(String),

    /// General I/O errors not covered by a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for configuration loading and validation.
///
/// Typically wrapped by [`CoreError::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read configuration file from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML (or contains unknown keys).
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds values the daemon cannot use.
    #[error("configuration validation failed: {0}")]
    Validation(String),

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },
}
