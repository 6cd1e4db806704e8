//! Top-level error type and classification shared by all crates.

use core::fmt;

use crate::{CalibrationError, RTError, ValidationError};

/// Top-level error type wrapping every sub-error of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ExoTorqueError {
    /// Real-time operation errors
    #[error("RT error: {0}")]
    RT(#[from] RTError),

    /// Offset calibration errors
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors (parse failures, missing files)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExoTorqueError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExoTorqueError::RT(_) => ErrorCategory::RT,
            ExoTorqueError::Calibration(_) => ErrorCategory::Calibration,
            ExoTorqueError::Validation(_) => ErrorCategory::Validation,
            ExoTorqueError::Io(_) => ErrorCategory::IO,
            ExoTorqueError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExoTorqueError::RT(e) => e.severity(),
            ExoTorqueError::Calibration(e) => e.severity(),
            ExoTorqueError::Validation(e) => e.severity(),
            ExoTorqueError::Io(_) => ErrorSeverity::Error,
            ExoTorqueError::Config(_) => ErrorSeverity::Error,
        }
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        ExoTorqueError::Config(msg.into())
    }
}

impl From<std::io::Error> for ExoTorqueError {
    fn from(e: std::io::Error) -> Self {
        ExoTorqueError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Real-time operation errors
    RT = 0,
    /// Offset calibration errors
    Calibration = 1,
    /// Configuration errors
    Config = 2,
    /// I/O errors
    IO = 3,
    /// Validation errors
    Validation = 4,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::RT => write!(f, "RT"),
            ErrorCategory::Calibration => write!(f, "Calibration"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the estimate stream can no longer be trusted
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
