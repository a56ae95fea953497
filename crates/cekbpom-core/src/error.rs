//! Core error types for the CekBpom scraper.
//!
//! This module defines the central error type shared by the engine and the
//! command-line shell. Engine-level run failures live in the scanner crate;
//! this module covers value validation and configuration problems.

use thiserror::Error;

/// Validation errors for values parsed from user input or upstream markup.
#[derive(Error, Debug)]
pub enum CekBpomError {
    /// Unknown search field name
    #[error("unknown search field: {0}")]
    UnknownField(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
