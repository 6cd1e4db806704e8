//! Prelude for common estimator types.
//!
//! ```
//! use exotorque_core::prelude::*;
//! ```

pub use crate::config::{
    CalibrationConfig, ControlConfig, DriveConfig, EstimatorConfig, SensingConfig,
};
pub use crate::estimator::{EstimatorState, RunningEstimator, TorqueEstimator};
pub use crate::hal::{
    AngleProvider, NullSink, PhaseChannel, PhaseSampler, RawSample, RecordingSink, TorqueSink,
};
pub use crate::pipeline::{TorqueEstimate, TorquePipeline};
pub use crate::sink::WriterSink;
pub use crate::transforms::{AlphaBeta, PhaseCurrents};

pub use exotorque_calibration::PhaseOffsets;
pub use exotorque_errors::{CalibrationError, RTError, RTResult, ValidationError};
