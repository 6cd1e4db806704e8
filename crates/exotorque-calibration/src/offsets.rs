//! Per-channel offset accumulation

use exotorque_errors::RTResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CalibrationError, CalibrationResult, MIN_CALIBRATION_SAMPLES};

/// Calibrated DC bias of both phase channels, in raw ADC counts.
///
/// # Examples
///
/// ```
/// use exotorque_calibration::PhaseOffsets;
///
/// let offsets = PhaseOffsets::new(2048.0, 2050.5);
/// assert!((offsets.b - 2050.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseOffsets {
    /// Mean idle reading of phase A.
    pub a: f64,
    /// Mean idle reading of phase B.
    pub b: f64,
}

impl PhaseOffsets {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Largest distance of either offset from ADC mid-scale, as a fraction
    /// of full scale.
    ///
    /// Bidirectional current amplifiers are referenced to mid-scale, so a
    /// large value hints that the bridge was driving current while the
    /// offsets were taken, or that the amplifier reference is off.
    pub fn midscale_deviation(&self, adc_max: u32) -> f64 {
        let full_scale = f64::from(adc_max.max(1));
        let mid = full_scale / 2.0;
        let dev_a = (self.a - mid).abs();
        let dev_b = (self.b - mid).abs();
        dev_a.max(dev_b) / full_scale
    }
}

/// Running sums of idle samples for both channels.
///
/// Sums are kept as integers so that a constant input reproduces exactly
/// the same offset.
#[derive(Debug, Clone, Default)]
pub struct OffsetAccumulator {
    sum_a: u64,
    sum_b: u64,
    count: u32,
}

impl OffsetAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one conversion pair.
    pub fn add(&mut self, raw_a: u32, raw_b: u32) {
        self.sum_a += u64::from(raw_a);
        self.sum_b += u64::from(raw_b);
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean of everything accumulated so far.
    pub fn finish(&self) -> CalibrationResult<PhaseOffsets> {
        if self.count == 0 {
            return Err(CalibrationError::NotComplete);
        }

        let n = f64::from(self.count);
        Ok(PhaseOffsets {
            a: self.sum_a as f64 / n,
            b: self.sum_b as f64 / n,
        })
    }

    pub fn reset(&mut self) {
        self.sum_a = 0;
        self.sum_b = 0;
        self.count = 0;
    }
}

/// Collect `samples` conversion pairs from `next_pair` and average them.
///
/// `next_pair` is called exactly `samples` times and must return the raw
/// phase A and phase B readings taken with the drive bridge disabled. The
/// first sampler error aborts calibration.
pub fn calibrate_offsets<F>(samples: u32, mut next_pair: F) -> CalibrationResult<PhaseOffsets>
where
    F: FnMut() -> RTResult<(u32, u32)>,
{
    if samples < MIN_CALIBRATION_SAMPLES {
        return Err(CalibrationError::TooFewSamples {
            requested: samples,
            min: MIN_CALIBRATION_SAMPLES,
        });
    }

    let mut accumulator = OffsetAccumulator::new();
    for _ in 0..samples {
        let (raw_a, raw_b) = next_pair()?;
        accumulator.add(raw_a, raw_b);
    }

    let offsets = accumulator.finish()?;
    debug!(
        samples,
        offset_a = offsets.a,
        offset_b = offsets.b,
        "offset accumulation complete"
    );
    Ok(offsets)
}
