//! Hardware collaborator traits.
//!
//! The estimator never touches peripherals itself. Board bring-up code
//! implements these traits over its ADC, encoder and serial port and hands
//! them to [`TorqueEstimator::new`](crate::TorqueEstimator::new).
//!
//! All three are called from the periodic step and must not block.

use exotorque_errors::RTResult;
use serde::{Deserialize, Serialize};

/// Raw ADC conversion result.
pub type RawSample = u32;

/// Sensed motor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseChannel {
    A,
    B,
}

impl PhaseChannel {
    pub const ALL: [PhaseChannel; 2] = [PhaseChannel::A, PhaseChannel::B];

    pub fn index(self) -> usize {
        match self {
            PhaseChannel::A => 0,
            PhaseChannel::B => 1,
        }
    }
}

/// Source of phase-current conversions.
pub trait PhaseSampler {
    /// One conversion of `channel`, in `[0, adc_max]`.
    ///
    /// Values above full scale are rejected by the estimator with
    /// `RTError::SampleOutOfRange`.
    fn sample(&mut self, channel: PhaseChannel) -> RTResult<RawSample>;
}

/// Source of the rotor electrical angle.
pub trait AngleProvider {
    /// Electrical angle in radians, nominally in `[0, 2π)`.
    ///
    /// For a motor with `p` pole pairs this is `p` times the mechanical
    /// angle. A non-finite value is treated as `RTError::AngleFault`.
    fn electrical_angle(&mut self) -> RTResult<f64>;
}

/// Destination for joint torque estimates.
pub trait TorqueSink {
    /// Emit one estimate in newton-meters.
    fn emit(&mut self, torque_nm: f32) -> RTResult;

    /// Push out anything still buffered. Called once when the estimator
    /// stops; a failure here is an output fault like any other.
    fn flush(&mut self) -> RTResult {
        Ok(())
    }
}

impl<T: PhaseSampler + ?Sized> PhaseSampler for &mut T {
    fn sample(&mut self, channel: PhaseChannel) -> RTResult<RawSample> {
        (**self).sample(channel)
    }
}

impl<T: AngleProvider + ?Sized> AngleProvider for &mut T {
    fn electrical_angle(&mut self) -> RTResult<f64> {
        (**self).electrical_angle()
    }
}

impl<T: TorqueSink + ?Sized> TorqueSink for &mut T {
    fn emit(&mut self, torque_nm: f32) -> RTResult {
        (**self).emit(torque_nm)
    }

    fn flush(&mut self) -> RTResult {
        (**self).flush()
    }
}

impl<T: PhaseSampler + ?Sized> PhaseSampler for Box<T> {
    fn sample(&mut self, channel: PhaseChannel) -> RTResult<RawSample> {
        (**self).sample(channel)
    }
}

impl<T: AngleProvider + ?Sized> AngleProvider for Box<T> {
    fn electrical_angle(&mut self) -> RTResult<f64> {
        (**self).electrical_angle()
    }
}

impl<T: TorqueSink + ?Sized> TorqueSink for Box<T> {
    fn emit(&mut self, torque_nm: f32) -> RTResult {
        (**self).emit(torque_nm)
    }

    fn flush(&mut self) -> RTResult {
        (**self).flush()
    }
}

/// Sink that keeps every emitted value in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    values: Vec<f32>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn last(&self) -> Option<f32> {
        self.values.last().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl TorqueSink for RecordingSink {
    fn emit(&mut self, torque_nm: f32) -> RTResult {
        self.values.push(torque_nm);
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TorqueSink for NullSink {
    fn emit(&mut self, _torque_nm: f32) -> RTResult {
        Ok(())
    }
}
