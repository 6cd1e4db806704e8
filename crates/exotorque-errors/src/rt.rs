//! Real-time error codes.
//!
//! Raised by the collaborators and the scheduler while the estimator is
//! running. They are `Copy`, fixed-size and carry a numeric code so a
//! supervisor can log or forward them without allocating.

use core::fmt;

use crate::common::ErrorSeverity;

/// Real-time error codes (pre-allocated for the RT path).
///
/// # Examples
///
/// ```
/// use exotorque_errors::{ErrorSeverity, RTError};
///
/// let err = RTError::SamplerFault;
/// assert_eq!(err.code(), 1);
/// assert_eq!(err.severity(), ErrorSeverity::Critical);
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RTError {
    /// Phase-current sampler failed to deliver a conversion
    SamplerFault = 1,
    /// Raw sample above the configured ADC full scale
    SampleOutOfRange = 2,
    /// Rotor-angle provider failed or returned a non-finite angle
    AngleFault = 3,
    /// Output sink rejected the torque value
    OutputFault = 4,
    /// Real-time timing violation (jitter exceeded threshold)
    TimingViolation = 5,
    /// One or more ticks were dropped because the loop overran
    DeadlineMissed = 6,
    /// Invalid configuration parameter in RT path
    InvalidConfig = 7,
}

impl RTError {
    /// Get the numeric error code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get the error severity.
    pub fn severity(self) -> ErrorSeverity {
        match self {
            RTError::SamplerFault => ErrorSeverity::Critical,
            RTError::SampleOutOfRange => ErrorSeverity::Critical,
            RTError::AngleFault => ErrorSeverity::Critical,
            RTError::OutputFault => ErrorSeverity::Critical,
            RTError::TimingViolation => ErrorSeverity::Warning,
            RTError::DeadlineMissed => ErrorSeverity::Warning,
            RTError::InvalidConfig => ErrorSeverity::Error,
        }
    }

    /// Whether the controlling process must stop.
    ///
    /// Collaborator faults are fatal; timing anomalies are reported by the
    /// scheduler and left to the caller.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            RTError::SamplerFault
                | RTError::SampleOutOfRange
                | RTError::AngleFault
                | RTError::OutputFault
                | RTError::InvalidConfig
        )
    }

    /// Create an error from a code.
    ///
    /// Returns `None` if the code does not correspond to a known error.
    ///
    /// # Examples
    ///
    /// ```
    /// use exotorque_errors::RTError;
    ///
    /// assert_eq!(RTError::from_code(4), Some(RTError::OutputFault));
    /// assert_eq!(RTError::from_code(0), None);
    /// ```
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RTError::SamplerFault),
            2 => Some(RTError::SampleOutOfRange),
            3 => Some(RTError::AngleFault),
            4 => Some(RTError::OutputFault),
            5 => Some(RTError::TimingViolation),
            6 => Some(RTError::DeadlineMissed),
            7 => Some(RTError::InvalidConfig),
            _ => None,
        }
    }
}

impl fmt::Display for RTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RTError::SamplerFault => write!(f, "Phase current sampler fault"),
            RTError::SampleOutOfRange => write!(f, "Raw sample exceeds ADC full scale"),
            RTError::AngleFault => write!(f, "Electrical angle provider fault"),
            RTError::OutputFault => write!(f, "Torque output sink fault"),
            RTError::TimingViolation => write!(f, "Real-time timing violation"),
            RTError::DeadlineMissed => write!(f, "RT deadline missed"),
            RTError::InvalidConfig => write!(f, "Invalid configuration parameter"),
        }
    }
}

impl std::error::Error for RTError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rt_error_codes() {
        assert_eq!(RTError::SamplerFault.code(), 1);
        assert_eq!(RTError::SampleOutOfRange.code(), 2);
        assert_eq!(RTError::InvalidConfig.code(), 7);
    }

    #[test]
    fn test_rt_error_from_code() {
        for code in 1..=7u8 {
            let err = RTError::from_code(code);
            assert_eq!(err.map(RTError::code), Some(code));
        }
        assert_eq!(RTError::from_code(8), None);
    }

    #[test]
    fn test_collaborator_faults_are_fatal() {
        assert!(RTError::SamplerFault.is_fatal());
        assert!(RTError::OutputFault.is_fatal());
        assert!(!RTError::DeadlineMissed.is_fatal());
        assert!(!RTError::TimingViolation.is_fatal());
    }

    #[test]
    fn test_rt_error_display() {
        assert_eq!(
            RTError::AngleFault.to_string(),
            "Electrical angle provider fault"
        );
    }

    #[test]
    fn test_rt_error_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<RTError>();
    }
}
