//! Deployment configuration.
//!
//! Every constant of the sensing chain and the drive train is a field here
//! rather than a literal in the math: a different shunt, amplifier or gearbox
//! changes the scaling without touching the algorithm. Defaults describe the
//! reference hardware (12-bit ADC at 3.3 V, INA240A1 gain 20, 1 mΩ low-side
//! shunts, 231 mN·m/A motor on a 50:1 planetary at 92 % efficiency).

use std::path::Path;

use exotorque_calibration::{DEFAULT_CALIBRATION_SAMPLES, MIN_CALIBRATION_SAMPLES};
use exotorque_errors::{ExoTorqueError, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Schema identifier written into every configuration file.
pub const CONFIG_SCHEMA_VERSION: &str = "exotorque.config/1";

/// Highest control frequency accepted by validation.
pub const MAX_CONTROL_FREQUENCY_HZ: u32 = 100_000;

/// Largest calibration run accepted by validation.
pub const MAX_CALIBRATION_SAMPLES: u32 = 1 << 20;

/// Current-sensing chain: ADC, amplifier and shunt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensingConfig {
    /// ADC full-scale count (4095 for a 12-bit converter).
    pub adc_max: u32,
    /// ADC reference voltage in volts.
    pub v_ref: f64,
    /// Current-sense amplifier gain in V/V.
    pub ina_gain: f64,
    /// Shunt resistance in ohms.
    pub shunt_ohms: f64,
}

impl Default for SensingConfig {
    fn default() -> Self {
        Self {
            adc_max: 4095,
            v_ref: 3.3,
            ina_gain: 20.0,
            shunt_ohms: 0.001,
        }
    }
}

impl SensingConfig {
    /// Convert an offset-corrected ADC count to phase current in amperes.
    ///
    /// `raw` is signed: a reading below the calibrated offset is current
    /// flowing the other way.
    ///
    /// # Examples
    ///
    /// ```
    /// use exotorque_core::SensingConfig;
    ///
    /// let sensing = SensingConfig::default();
    /// assert_eq!(sensing.raw_to_current(0.0), 0.0);
    /// assert!(sensing.raw_to_current(-100.0) < 0.0);
    /// ```
    #[inline]
    pub fn raw_to_current(&self, raw: f64) -> f64 {
        let v_adc = (raw / f64::from(self.adc_max)) * self.v_ref;
        let v_shunt = v_adc / self.ina_gain;
        v_shunt / self.shunt_ohms
    }

    /// Current represented by one ADC count.
    pub fn amps_per_count(&self) -> f64 {
        self.raw_to_current(1.0)
    }

    /// Largest current magnitude the chain can measure around mid-scale.
    pub fn full_scale_current(&self) -> f64 {
        self.raw_to_current(f64::from(self.adc_max) / 2.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_range("sensing.adc_max", self.adc_max, 1, u32::from(u16::MAX))?;
        ValidationError::check_positive("sensing.v_ref", self.v_ref)?;
        ValidationError::check_positive("sensing.ina_gain", self.ina_gain)?;
        ValidationError::check_positive("sensing.shunt_ohms", self.shunt_ohms)?;
        Ok(())
    }
}

/// Motor and gearbox constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Motor torque constant in N·m per ampere of q-axis current.
    pub k_torque: f64,
    /// Output turns per motor turn, inverted (motor / output).
    pub gear_ratio: f64,
    /// Constant gearbox efficiency in `(0, 1]`.
    pub gear_efficiency: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            k_torque: 0.231,
            gear_ratio: 50.0,
            gear_efficiency: 0.92,
        }
    }
}

impl DriveConfig {
    /// Motor shaft torque for a q-axis current.
    #[inline]
    pub fn motor_torque(&self, i_q: f64) -> f64 {
        self.k_torque * i_q
    }

    /// Joint torque delivered through the gearbox for a motor torque.
    ///
    /// Efficiency is a flat constant; it does not depend on speed, load or
    /// the direction of power flow.
    #[inline]
    pub fn joint_torque(&self, motor_torque: f64) -> f64 {
        motor_torque * self.gear_ratio * self.gear_efficiency
    }

    /// Joint torque per ampere of q-axis current.
    pub fn joint_torque_per_amp(&self) -> f64 {
        self.joint_torque(self.motor_torque(1.0))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_positive("drive.k_torque", self.k_torque)?;
        ValidationError::check_positive("drive.gear_ratio", self.gear_ratio)?;
        ValidationError::check_positive("drive.gear_efficiency", self.gear_efficiency)?;
        ValidationError::check_range("drive.gear_efficiency", self.gear_efficiency, 0.0, 1.0)?;
        Ok(())
    }
}

/// Periodic execution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Estimation rate in hertz.
    pub frequency_hz: u32,
    /// Share of the period one step may use before it counts as over budget.
    pub execution_budget_fraction: f64,
    /// Treat any dropped tick as fatal instead of logging it.
    pub fail_on_overrun: bool,
    /// Optional hard jitter limit in microseconds.
    pub max_jitter_us: Option<u64>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 10_000,
            execution_budget_fraction: 0.5,
            fail_on_overrun: false,
            max_jitter_us: None,
        }
    }
}

impl ControlConfig {
    /// Control period in nanoseconds.
    pub fn period_ns(&self) -> u64 {
        1_000_000_000 / u64::from(self.frequency_hz.max(1))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_range(
            "control.frequency_hz",
            self.frequency_hz,
            1,
            MAX_CONTROL_FREQUENCY_HZ,
        )?;
        ValidationError::check_positive(
            "control.execution_budget_fraction",
            self.execution_budget_fraction,
        )?;
        ValidationError::check_range(
            "control.execution_budget_fraction",
            self.execution_budget_fraction,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

/// Offset calibration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Idle conversions averaged per channel.
    pub samples: u32,
    /// Offset distance from mid-scale, as a fraction of full scale, above
    /// which calibration logs a warning.
    pub max_offset_deviation: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_CALIBRATION_SAMPLES,
            max_offset_deviation: 0.05,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_range(
            "calibration.samples",
            self.samples,
            MIN_CALIBRATION_SAMPLES,
            MAX_CALIBRATION_SAMPLES,
        )?;
        if !self.max_offset_deviation.is_finite() {
            return Err(ValidationError::not_finite(
                "calibration.max_offset_deviation",
            ));
        }
        ValidationError::check_range(
            "calibration.max_offset_deviation",
            self.max_offset_deviation,
            0.0,
            0.5,
        )?;
        Ok(())
    }
}

/// Complete estimator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Configuration schema version
    pub schema_version: String,
    pub sensing: SensingConfig,
    pub drive: DriveConfig,
    pub control: ControlConfig,
    pub calibration: CalibrationConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            sensing: SensingConfig::default(),
            drive: DriveConfig::default(),
            control: ControlConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl EstimatorConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != CONFIG_SCHEMA_VERSION {
            return Err(ValidationError::constraint(format!(
                "unsupported schema version '{}', expected '{}'",
                self.schema_version, CONFIG_SCHEMA_VERSION
            )));
        }
        self.sensing.validate()?;
        self.drive.validate()?;
        self.control.validate()?;
        self.calibration.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> exotorque_errors::Result<Self> {
        let config: EstimatorConfig = serde_json::from_str(content)
            .map_err(|e| ExoTorqueError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> exotorque_errors::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExoTorqueError::config(format!("failed to serialize config: {e}")))
    }

    /// Load and validate configuration from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> exotorque_errors::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        debug!(path = %path.display(), "loaded estimator config");
        Ok(config)
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> exotorque_errors::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        debug!(path = %path.display(), "saved estimator config");
        Ok(())
    }
}
