//! Typestate torque estimator.
//!
//! ```text
//! TorqueEstimator ──calibrate()──▶ RunningEstimator ──step()──▶ TorqueEstimate
//!  (Uninitialized)   (Calibrating)       (Running)
//! ```
//!
//! `step()` exists only on [`RunningEstimator`], and the only way to get one
//! is to calibrate, so no estimate can ever be computed against offsets
//! that were never measured.

use std::fmt;

use exotorque_calibration::{CalibrationResult, PhaseOffsets, calibrate_offsets};
use exotorque_errors::{RTError, RTResult, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::EstimatorConfig;
use crate::hal::{AngleProvider, PhaseChannel, PhaseSampler, RawSample, TorqueSink};
use crate::pipeline::{TorqueEstimate, TorquePipeline};

/// Lifecycle phase of an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimatorState {
    Uninitialized,
    Calibrating,
    Running,
}

impl fmt::Display for EstimatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorState::Uninitialized => write!(f, "uninitialized"),
            EstimatorState::Calibrating => write!(f, "calibrating"),
            EstimatorState::Running => write!(f, "running"),
        }
    }
}

/// Read one conversion and reject anything above full scale.
#[inline]
fn read_sample<S: PhaseSampler>(
    sampler: &mut S,
    channel: PhaseChannel,
    adc_max: u32,
) -> RTResult<RawSample> {
    let raw = sampler.sample(channel)?;
    if raw > adc_max {
        return Err(RTError::SampleOutOfRange);
    }
    Ok(raw)
}

/// An estimator that has not been calibrated yet.
///
/// Owns its three collaborators. Pass `&mut` references instead when the
/// caller needs to keep them.
pub struct TorqueEstimator<S, A, O> {
    config: EstimatorConfig,
    sampler: S,
    angle: A,
    sink: O,
}

impl<S, A, O> TorqueEstimator<S, A, O>
where
    S: PhaseSampler,
    A: AngleProvider,
    O: TorqueSink,
{
    /// Validate `config` and take ownership of the collaborators.
    pub fn new(
        config: EstimatorConfig,
        sampler: S,
        angle: A,
        sink: O,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            sampler,
            angle,
            sink,
        })
    }

    pub fn state(&self) -> EstimatorState {
        EstimatorState::Uninitialized
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Measure the channel offsets and start running.
    ///
    /// Takes `calibration.samples` A/B conversion pairs. The drive bridge
    /// must be disabled for the whole call; this is not checked, but offsets
    /// far from mid-scale are logged as a warning.
    ///
    /// # Errors
    ///
    /// `CalibrationError::Sampling` when the sampler fails or returns a value
    /// above `adc_max`. The collaborators are dropped with the estimator.
    pub fn calibrate(mut self) -> CalibrationResult<RunningEstimator<S, A, O>> {
        let samples = self.config.calibration.samples;
        let adc_max = self.config.sensing.adc_max;
        info!(
            from = %EstimatorState::Uninitialized,
            to = %EstimatorState::Calibrating,
            samples,
            "starting offset calibration"
        );

        let sampler = &mut self.sampler;
        let offsets = calibrate_offsets(samples, || {
            let raw_a = read_sample(&mut *sampler, PhaseChannel::A, adc_max)?;
            let raw_b = read_sample(&mut *sampler, PhaseChannel::B, adc_max)?;
            Ok((raw_a, raw_b))
        })
        .inspect_err(|e| error!(error = %e, "offset calibration failed"))?;

        let deviation = offsets.midscale_deviation(adc_max);
        if deviation > self.config.calibration.max_offset_deviation {
            warn!(
                offset_a = offsets.a,
                offset_b = offsets.b,
                deviation,
                limit = self.config.calibration.max_offset_deviation,
                "offsets far from mid-scale; was the drive active during calibration?"
            );
        }

        info!(
            offset_a = offsets.a,
            offset_b = offsets.b,
            to = %EstimatorState::Running,
            "offset calibration complete"
        );

        Ok(RunningEstimator {
            pipeline: TorquePipeline::new(self.config.sensing, self.config.drive, offsets),
            adc_max,
            steps: 0,
            sampler: self.sampler,
            angle: self.angle,
            sink: self.sink,
        })
    }

    /// Give the collaborators back without calibrating.
    pub fn into_parts(self) -> (S, A, O) {
        (self.sampler, self.angle, self.sink)
    }
}

/// A calibrated estimator, ready for periodic steps.
///
/// Offsets are fixed for the lifetime of this value. Recalibrating means
/// [`into_parts`](Self::into_parts) and a fresh [`TorqueEstimator`].
pub struct RunningEstimator<S, A, O> {
    pipeline: TorquePipeline,
    adc_max: u32,
    steps: u64,
    sampler: S,
    angle: A,
    sink: O,
}

impl<S, A, O> RunningEstimator<S, A, O>
where
    S: PhaseSampler,
    A: AngleProvider,
    O: TorqueSink,
{
    /// One estimation step: sample A, sample B, read the angle, estimate,
    /// emit the joint torque.
    ///
    /// # RT-Safety
    ///
    /// No allocation, no logging and no blocking beyond what the
    /// collaborators do.
    ///
    /// # Errors
    ///
    /// Any collaborator error, `RTError::SampleOutOfRange` for a conversion
    /// above `adc_max`, `RTError::AngleFault` for a non-finite angle. All are
    /// fatal; nothing is emitted for a failed step.
    #[inline]
    pub fn step(&mut self) -> RTResult<TorqueEstimate> {
        let raw_a = read_sample(&mut self.sampler, PhaseChannel::A, self.adc_max)?;
        let raw_b = read_sample(&mut self.sampler, PhaseChannel::B, self.adc_max)?;

        let theta_e = self.angle.electrical_angle()?;
        if !theta_e.is_finite() {
            return Err(RTError::AngleFault);
        }

        let estimate = self.pipeline.estimate(raw_a, raw_b, theta_e);
        self.sink.emit(estimate.wire_value())?;
        self.steps += 1;
        Ok(estimate)
    }

    pub fn state(&self) -> EstimatorState {
        EstimatorState::Running
    }

    #[inline]
    pub fn offsets(&self) -> PhaseOffsets {
        self.pipeline.offsets()
    }

    #[inline]
    pub fn pipeline(&self) -> &TorquePipeline {
        &self.pipeline
    }

    /// Successful steps so far.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn angle_provider_mut(&mut self) -> &mut A {
        &mut self.angle
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut O {
        &mut self.sink
    }

    /// Stop running and release the collaborators.
    pub fn into_parts(self) -> (S, A, O) {
        (self.sampler, self.angle, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalibrationConfig;
    use crate::hal::RecordingSink;
    use exotorque_errors::CalibrationError;

    struct ConstSampler {
        a: RawSample,
        b: RawSample,
        calls: u32,
    }

    impl PhaseSampler for ConstSampler {
        fn sample(&mut self, channel: PhaseChannel) -> RTResult<RawSample> {
            self.calls += 1;
            Ok(match channel {
                PhaseChannel::A => self.a,
                PhaseChannel::B => self.b,
            })
        }
    }

    struct FixedAngle(f64);

    impl AngleProvider for FixedAngle {
        fn electrical_angle(&mut self) -> RTResult<f64> {
            Ok(self.0)
        }
    }

    fn config_with_samples(samples: u32) -> EstimatorConfig {
        EstimatorConfig {
            calibration: CalibrationConfig {
                samples,
                ..CalibrationConfig::default()
            },
            ..EstimatorConfig::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = TorqueEstimator::new(
            config_with_samples(8),
            ConstSampler { a: 0, b: 0, calls: 0 },
            FixedAngle(0.0),
            RecordingSink::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_calibration_uses_constant_input_exactly() -> Result<(), Box<dyn std::error::Error>> {
        let estimator = TorqueEstimator::new(
            config_with_samples(256),
            ConstSampler {
                a: 2051,
                b: 2040,
                calls: 0,
            },
            FixedAngle(0.0),
            RecordingSink::new(),
        )?;
        assert_eq!(estimator.state(), EstimatorState::Uninitialized);

        let mut running = estimator.calibrate()?;
        assert_eq!(running.state(), EstimatorState::Running);
        assert_eq!(running.offsets(), PhaseOffsets::new(2051.0, 2040.0));
        assert_eq!(running.sampler_mut().calls, 512);

        let estimate = running.step()?;
        assert_eq!(estimate.joint_torque_nm, 0.0);
        assert_eq!(running.sink().values(), &[0.0]);
        assert_eq!(running.steps(), 1);
        Ok(())
    }

    #[test]
    fn test_out_of_range_during_calibration() -> Result<(), Box<dyn std::error::Error>> {
        let estimator = TorqueEstimator::new(
            config_with_samples(256),
            ConstSampler {
                a: 5000,
                b: 2048,
                calls: 0,
            },
            FixedAngle(0.0),
            RecordingSink::new(),
        )?;
        assert!(matches!(
            estimator.calibrate(),
            Err(CalibrationError::Sampling(RTError::SampleOutOfRange))
        ));
        Ok(())
    }

    #[test]
    fn test_non_finite_angle_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let mut running = TorqueEstimator::new(
            config_with_samples(256),
            ConstSampler {
                a: 2048,
                b: 2048,
                calls: 0,
            },
            FixedAngle(f64::NAN),
            RecordingSink::new(),
        )?
        .calibrate()?;

        assert_eq!(running.step(), Err(RTError::AngleFault));
        assert!(running.sink().values().is_empty());
        assert_eq!(running.steps(), 0);
        Ok(())
    }

    #[test]
    fn test_into_parts_returns_collaborators() -> Result<(), Box<dyn std::error::Error>> {
        let running = TorqueEstimator::new(
            config_with_samples(256),
            ConstSampler {
                a: 2048,
                b: 2048,
                calls: 0,
            },
            FixedAngle(0.25),
            RecordingSink::new(),
        )?
        .calibrate()?;

        let (sampler, angle, sink) = running.into_parts();
        assert_eq!(sampler.calls, 512);
        assert_eq!(angle.0, 0.25);
        assert!(sink.values().is_empty());
        Ok(())
    }

    #[test]
    fn test_state_display() {
        assert_eq!(EstimatorState::Calibrating.to_string(), "calibrating");
    }
}
