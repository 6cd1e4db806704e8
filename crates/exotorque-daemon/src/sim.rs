//! Simulated bench collaborators.
//!
//! A stand-in for the joint hardware so the estimator can run on a host:
//! [`SimulatedDrive`] produces phase-current conversions for a commanded
//! q-axis current at the simulated rotor angle, and [`RampAngleProvider`]
//! turns that angle at a fixed rate.
//!
//! The ramp is the placeholder angle source the first firmware bring-up
//! used. It has nothing to do with a real encoder and must not be mistaken
//! for the angle contract a deployment has to meet.

use std::cell::Cell;
use std::rc::Rc;

use exotorque_core::config::SensingConfig;
use exotorque_core::hal::{AngleProvider, PhaseChannel, PhaseSampler, RawSample};
use exotorque_core::transforms::wrap_angle;
use exotorque_errors::{RTResult, ValidationError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Rotor angle step of the placeholder ramp, per call.
pub const DEFAULT_ANGLE_STEP_RAD: f64 = 0.001;

/// Operating point and imperfections of the simulated joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Commanded torque-producing current.
    pub iq_amps: f64,
    /// Commanded flux current; zero for a surface PM motor.
    pub id_amps: f64,
    /// Amplifier output at zero current, per channel, in counts.
    pub bias_a: f64,
    pub bias_b: f64,
    /// Peak uniform noise in counts.
    pub noise_counts: f64,
    pub angle_step_rad: f64,
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            iq_amps: 2.0,
            id_amps: 0.0,
            bias_a: 2048.0,
            bias_b: 2048.0,
            noise_counts: 0.0,
            angle_step_rad: DEFAULT_ANGLE_STEP_RAD,
            seed: 1,
        }
    }
}

fn check_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::not_finite(field))
    }
}

impl SimParams {
    /// Reject operating points the simulated converter cannot produce.
    /// Bias and peak noise must lie within `[0, adc_max]` counts.
    ///
    /// # Errors
    ///
    /// The first non-finite or out-of-range field.
    pub fn validate(&self, sensing: &SensingConfig) -> Result<(), ValidationError> {
        let full_scale = f64::from(sensing.adc_max);
        check_finite("sim.iq_amps", self.iq_amps)?;
        check_finite("sim.id_amps", self.id_amps)?;
        check_finite("sim.angle_step_rad", self.angle_step_rad)?;
        for (field, value) in [
            ("sim.bias_a", self.bias_a),
            ("sim.bias_b", self.bias_b),
            ("sim.noise_counts", self.noise_counts),
        ] {
            check_finite(field, value)?;
            ValidationError::check_range(field, value, 0.0, full_scale)?;
        }
        Ok(())
    }
}

/// Bridge enable line shared between the bench and the drive.
///
/// The drive starts disabled so that calibration sees only the amplifier
/// bias.
#[derive(Debug, Clone, Default)]
pub struct DriveEnable(Rc<Cell<bool>>);

impl DriveEnable {
    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.get()
    }
}

/// Phase-current conversions of a simulated three-phase joint.
#[derive(Debug)]
pub struct SimulatedDrive {
    sensing: SensingConfig,
    params: SimParams,
    theta: Rc<Cell<f64>>,
    enable: DriveEnable,
    rng: StdRng,
}

impl SimulatedDrive {
    /// Ideal phase currents `(I_a, I_b)` for the commanded d/q currents at
    /// `theta_e`: inverse Park, then inverse Clarke.
    pub fn phase_currents(&self, theta_e: f64) -> (f64, f64) {
        let (sin, cos) = theta_e.sin_cos();
        let alpha = self.params.id_amps * cos - self.params.iq_amps * sin;
        let beta = self.params.id_amps * sin + self.params.iq_amps * cos;
        let i_a = alpha;
        let i_b = (-alpha + 3.0_f64.sqrt() * beta) / 2.0;
        (i_a, i_b)
    }

    pub fn set_iq(&mut self, iq_amps: f64) {
        self.params.iq_amps = iq_amps;
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn enable(&self) -> &DriveEnable {
        &self.enable
    }

    fn convert(&mut self, current: f64, bias: f64) -> RawSample {
        let noise = if self.params.noise_counts > 0.0 {
            self.rng
                .random_range(-self.params.noise_counts..=self.params.noise_counts)
        } else {
            0.0
        };
        let counts = bias + current / self.sensing.amps_per_count() + noise;
        // Saturates like the real converter
        counts.round().clamp(0.0, f64::from(self.sensing.adc_max)) as RawSample
    }
}

impl PhaseSampler for SimulatedDrive {
    fn sample(&mut self, channel: PhaseChannel) -> RTResult<RawSample> {
        let (i_a, i_b) = if self.enable.is_enabled() {
            self.phase_currents(self.theta.get())
        } else {
            (0.0, 0.0)
        };
        Ok(match channel {
            PhaseChannel::A => self.convert(i_a, self.params.bias_a),
            PhaseChannel::B => self.convert(i_b, self.params.bias_b),
        })
    }
}

/// Placeholder angle source: a fixed step per call, wrapped at 2π.
///
/// Returns the current angle and then advances, so the conversions taken
/// earlier in the same step and the angle reported for it agree.
#[derive(Debug, Clone)]
pub struct RampAngleProvider {
    theta: Rc<Cell<f64>>,
    step: f64,
}

impl RampAngleProvider {
    /// A ramp not connected to any simulated drive.
    pub fn standalone(step: f64) -> Self {
        Self {
            theta: Rc::new(Cell::new(0.0)),
            step,
        }
    }

    pub fn angle(&self) -> f64 {
        self.theta.get()
    }
}

impl AngleProvider for RampAngleProvider {
    fn electrical_angle(&mut self) -> RTResult<f64> {
        let theta = self.theta.get();
        self.theta.set(wrap_angle(theta + self.step));
        Ok(theta)
    }
}

/// A simulated joint: drive, angle ramp and the bridge enable line, all
/// sharing one rotor.
pub fn bench(
    sensing: SensingConfig,
    params: SimParams,
) -> (SimulatedDrive, RampAngleProvider, DriveEnable) {
    let theta = Rc::new(Cell::new(0.0));
    let enable = DriveEnable::default();
    let drive = SimulatedDrive {
        sensing,
        params,
        theta: Rc::clone(&theta),
        enable: enable.clone(),
        rng: StdRng::seed_from_u64(params.seed),
    };
    let ramp = RampAngleProvider {
        theta,
        step: params.angle_step_rad,
    };
    (drive, ramp, enable)
}
