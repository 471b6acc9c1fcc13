//! Core error types.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown business unit.
    #[error("Unknown business unit: {0}")]
    UnknownBusinessUnit(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file was not found.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// I/O error while reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON5 parse error.
    #[error("JSON5 parse error: {0}")]
    Json5(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Parse(String),

    /// Validation failed with one or more problems.
    #[error("Config validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
