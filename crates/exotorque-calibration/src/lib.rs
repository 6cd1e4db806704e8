//! Phase-current offset calibration
//!
//! Current-sense amplifiers sit at a DC bias when no current flows. This
//! crate averages idle ADC conversions per phase channel to recover that
//! bias so the estimator can subtract it from every later sample.
//!
//! The drive bridge must be inactive while samples are collected. Nothing
//! here can detect a violation; an offset taken with current flowing
//! linearly biases every torque estimate that follows.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod offsets;

pub use offsets::*;

pub use exotorque_errors::CalibrationError;

pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Sample count used when the configuration does not override it.
pub const DEFAULT_CALIBRATION_SAMPLES: u32 = 1024;

/// Fewer idle samples than this leave too much ADC noise in the mean.
pub const MIN_CALIBRATION_SAMPLES: u32 = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = CalibrationError::NotComplete;
        assert_eq!(format!("{}", err), "Calibration not complete");
    }

    #[test]
    fn test_default_respects_minimum() {
        assert!(DEFAULT_CALIBRATION_SAMPLES >= MIN_CALIBRATION_SAMPLES);
    }
}
