use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pmstore
#[derive(Error, Debug)]
pub enum PmError {
    /// Location reference did not map to an agent name
    #[error("Cannot resolve agent name from location: {location:?}")]
    Resolution { location: String },

    /// Agent store could not be opened
    #[error("Agent store {entity_id:03}-{name} unavailable: {reason}")]
    StoreUnavailable {
        entity_id: u32,
        name: String,
        reason: String,
    },

    /// Statement preparation or execution failed
    #[error("Write error: {0}")]
    Write(#[from] rusqlite::Error),

    /// Query against an agent store failed
    #[error("Read error: {0}")]
    Read(rusqlite::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PmError {
    /// Classify a recorder failure. Ambient errors have no kind.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PmError::Resolution { .. } => Some(ErrorKind::Resolution),
            PmError::StoreUnavailable { .. } => Some(ErrorKind::StoreUnavailable),
            PmError::Write(_) => Some(ErrorKind::Write),
            PmError::Read(_) => Some(ErrorKind::Read),
            _ => None,
        }
    }

    /// Reclassify a storage failure raised by a read-only query
    pub fn into_read(self) -> Self {
        match self {
            PmError::Write(e) => PmError::Read(e),
            other => other,
        }
    }
}

/// Failure taxonomy of the event recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Resolution,
    StoreUnavailable,
    Write,
    Read,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Resolution => "resolution",
            ErrorKind::StoreUnavailable => "store_unavailable",
            ErrorKind::Write => "write",
            ErrorKind::Read => "read",
        };
        f.write_str(s)
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for pmstore operations
pub type Result<T> = std::result::Result<T, PmError>;
