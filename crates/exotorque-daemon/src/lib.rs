//! Bench daemon for the joint torque estimator
//!
//! Runs a calibrated estimator against a simulated joint at the configured
//! control rate and streams the estimates to a file, device or stdout.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod runner;
pub mod sim;

pub use runner::{RunLimits, RunSummary, StopReason, run, scheduler_for};
pub use sim::{DriveEnable, RampAngleProvider, SimParams, SimulatedDrive, bench};
