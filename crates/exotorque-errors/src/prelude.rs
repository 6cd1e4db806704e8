//! Prelude module for convenient error handling imports.

pub use crate::{
    RTResult, Result,
    calibration::CalibrationError,
    common::{ErrorCategory, ErrorSeverity, ExoTorqueError},
    rt::RTError,
    validation::ValidationError,
};
