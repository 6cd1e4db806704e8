//! Centralized error types for the exoskeleton joint torque estimator
//!
//! Two families of errors live here:
//!
//! - [`rt`]: `Copy` error codes raised from the periodic estimation step.
//!   They never allocate and are safe to return from the hot path.
//! - [`validation`], [`calibration`] and [`common`]: richer errors raised
//!   during start-up (configuration, offset calibration, I/O).
//!
//! Every failure in the periodic path is fatal to the controlling process;
//! there is no retry machinery in this crate, only classification.
//!
//! # Example
//!
//! ```
//! use exotorque_errors::prelude::*;
//!
//! fn check_gain(gain: f64) -> Result<f64> {
//!     if gain <= 0.0 {
//!         return Err(ValidationError::not_positive("sensing.ina_gain", gain).into());
//!     }
//!     Ok(gain)
//! }
//!
//! assert!(check_gain(20.0).is_ok());
//! assert!(check_gain(0.0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod calibration;
pub mod common;
pub mod prelude;
pub mod rt;
pub mod validation;

pub use calibration::CalibrationError;
pub use common::{ErrorCategory, ErrorSeverity, ExoTorqueError};
pub use rt::RTError;
pub use validation::ValidationError;

/// A specialized `Result` type for start-up and tooling operations.
pub type Result<T> = std::result::Result<T, ExoTorqueError>;

/// A specialized `Result` type for real-time operations.
pub type RTResult<T = ()> = std::result::Result<T, RTError>;
