//! Offset calibration errors.

use crate::common::ErrorSeverity;
use crate::rt::RTError;

/// Errors raised while computing the per-channel current offsets.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// No samples were accumulated
    #[error("Calibration not complete")]
    NotComplete,

    /// Requested sample count is below the minimum
    #[error("Calibration needs at least {min} samples, got {requested}")]
    TooFewSamples {
        /// Requested sample count
        requested: u32,
        /// Minimum accepted sample count
        min: u32,
    },

    /// The sampler failed during calibration
    #[error("Sampling failed during calibration: {0}")]
    Sampling(#[from] RTError),
}

impl CalibrationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CalibrationError::NotComplete => ErrorSeverity::Error,
            CalibrationError::TooFewSamples { .. } => ErrorSeverity::Error,
            CalibrationError::Sampling(e) => e.severity(),
        }
    }
}
