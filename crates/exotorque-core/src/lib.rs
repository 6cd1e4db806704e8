//! Joint torque estimation from two phase-current samples
//!
//! Each tick turns two raw ADC conversions and a rotor angle into one joint
//! torque value:
//!
//! 1. subtract the calibrated per-channel offsets
//! 2. convert counts to amperes through the amplifier and shunt
//! 3. Clarke transform to the stationary αβ frame
//! 4. Park transform to the q-axis at the electrical angle
//! 5. scale by the motor torque constant and the gearbox
//!
//! Hardware is reached only through the [`hal`] traits. The estimator is a
//! typestate: [`TorqueEstimator::calibrate`] consumes the uninitialized
//! estimator and returns the only type with a `step()`.
//!
//! # Example
//!
//! ```
//! use exotorque_core::prelude::*;
//!
//! struct Idle;
//! impl PhaseSampler for Idle {
//!     fn sample(&mut self, _channel: PhaseChannel) -> RTResult<RawSample> {
//!         Ok(2048)
//!     }
//! }
//!
//! struct Zero;
//! impl AngleProvider for Zero {
//!     fn electrical_angle(&mut self) -> RTResult<f64> {
//!         Ok(0.0)
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let estimator = TorqueEstimator::new(EstimatorConfig::default(), Idle, Zero, RecordingSink::new())?;
//! let mut running = estimator.calibrate()?;
//! let estimate = running.step()?;
//! assert_eq!(estimate.joint_torque_nm, 0.0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod estimator;
pub mod hal;
pub mod pipeline;
pub mod prelude;
pub mod sink;
pub mod transforms;
pub mod wire;

pub use config::{
    CONFIG_SCHEMA_VERSION, CalibrationConfig, ControlConfig, DriveConfig, EstimatorConfig,
    SensingConfig,
};
pub use estimator::{EstimatorState, RunningEstimator, TorqueEstimator};
pub use hal::{AngleProvider, PhaseChannel, PhaseSampler, RawSample, TorqueSink};
pub use pipeline::{TorqueEstimate, TorquePipeline};
pub use sink::WriterSink;
pub use transforms::{AlphaBeta, PhaseCurrents};

pub use exotorque_calibration::PhaseOffsets;
