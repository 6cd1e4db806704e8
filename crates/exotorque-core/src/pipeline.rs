//! The pure estimation pipeline.
//!
//! offset correction → current conversion → Clarke → Park → torque scaling
//!
//! [`TorquePipeline`] holds only numbers. It has no collaborators and no
//! mutable state, so the same inputs always give the same estimate.

use exotorque_calibration::PhaseOffsets;
use serde::{Deserialize, Serialize};

use crate::config::{DriveConfig, SensingConfig};
use crate::hal::RawSample;
use crate::transforms::{AlphaBeta, PhaseCurrents};

/// Everything one estimation step computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorqueEstimate {
    pub raw_a: RawSample,
    pub raw_b: RawSample,
    /// Offset-corrected phase currents.
    pub currents: PhaseCurrents,
    pub alpha_beta: AlphaBeta,
    /// Electrical angle used for the Park transform.
    pub theta_e: f64,
    /// Quadrature current in amperes.
    pub i_q: f64,
    /// Torque at the motor shaft.
    pub motor_torque_nm: f64,
    /// Torque at the joint, after the gearbox.
    pub joint_torque_nm: f64,
}

impl TorqueEstimate {
    /// The value that goes on the wire.
    #[inline]
    pub fn wire_value(&self) -> f32 {
        self.joint_torque_nm as f32
    }
}

/// Offsets plus scaling constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorquePipeline {
    sensing: SensingConfig,
    drive: DriveConfig,
    offsets: PhaseOffsets,
}

impl TorquePipeline {
    pub fn new(sensing: SensingConfig, drive: DriveConfig, offsets: PhaseOffsets) -> Self {
        Self {
            sensing,
            drive,
            offsets,
        }
    }

    #[inline]
    pub fn offsets(&self) -> PhaseOffsets {
        self.offsets
    }

    #[inline]
    pub fn sensing(&self) -> &SensingConfig {
        &self.sensing
    }

    #[inline]
    pub fn drive(&self) -> &DriveConfig {
        &self.drive
    }

    /// Offset-corrected phase currents for one pair of conversions.
    #[inline]
    pub fn phase_currents(&self, raw_a: RawSample, raw_b: RawSample) -> PhaseCurrents {
        PhaseCurrents {
            a: self
                .sensing
                .raw_to_current(f64::from(raw_a) - self.offsets.a),
            b: self
                .sensing
                .raw_to_current(f64::from(raw_b) - self.offsets.b),
        }
    }

    /// Run the whole pipeline on one pair of conversions.
    ///
    /// Raw values are not range checked here; the estimator does that
    /// against `adc_max` before calling in.
    #[inline]
    pub fn estimate(&self, raw_a: RawSample, raw_b: RawSample, theta_e: f64) -> TorqueEstimate {
        let currents = self.phase_currents(raw_a, raw_b);
        let alpha_beta = currents.clarke();
        let i_q = alpha_beta.park_q(theta_e);
        let motor_torque_nm = self.drive.motor_torque(i_q);
        let joint_torque_nm = self.drive.joint_torque(motor_torque_nm);

        TorqueEstimate {
            raw_a,
            raw_b,
            currents,
            alpha_beta,
            theta_e,
            i_q,
            motor_torque_nm,
            joint_torque_nm,
        }
    }
}
