//! Structured error types for configuration loading and access.

use crate::formats::ParseError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Lookup errors
    AbsentKey,

    // Source errors
    UnsupportedFormat,
    MalformedSource,
    IoError,

    // Value errors
    ConversionFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AbsentKey => "ABSENT_KEY",
            ErrorCode::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorCode::MalformedSource => "MALFORMED_SOURCE",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::ConversionFailure => "CONVERSION_FAILURE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value could not be coerced by a converter running in strict mode.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot convert {value} to {target}: {reason}")]
pub struct ConversionError {
    /// Rendered input value.
    pub value: String,
    /// Name of the requested target type.
    pub target: &'static str,
    pub reason: String,
}

impl ConversionError {
    pub fn new(value: impl Into<String>, target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            target,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building or reading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required lookup did not resolve.
    #[error("configuration key not found: `{0}`")]
    AbsentKey(String),

    /// A located file has no registered parser for its extension or name.
    #[error("unsupported configuration format: `{}`", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A registered parser rejected the file contents.
    #[error("malformed configuration source `{}`: {source}", path.display())]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl ConfigError {
    pub fn absent(key: impl Into<String>) -> Self {
        ConfigError::AbsentKey(key.into())
    }

    pub fn malformed(path: impl Into<PathBuf>, source: ParseError) -> Self {
        ConfigError::MalformedSource {
            path: path.into(),
            source,
        }
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::AbsentKey(_) => ErrorCode::AbsentKey,
            ConfigError::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
            ConfigError::MalformedSource { .. } => ErrorCode::MalformedSource,
            ConfigError::Io(..) => ErrorCode::IoError,
            ConfigError::Conversion(_) => ErrorCode::ConversionFailure,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
