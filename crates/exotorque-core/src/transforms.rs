//! Clarke and Park transforms.
//!
//! Two measured phase currents are enough for a three-phase machine with an
//! isolated star point: `I_c = -(I_a + I_b)`. That balance is assumed, never
//! checked; an unbalanced machine skews `I_beta` without any error.

use serde::{Deserialize, Serialize};

/// Phase A and B currents in amperes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseCurrents {
    pub a: f64,
    pub b: f64,
}

impl PhaseCurrents {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Stationary-frame components of these currents.
    #[inline]
    pub fn clarke(self) -> AlphaBeta {
        clarke(self.a, self.b)
    }
}

/// Stationary two-axis (αβ) current in amperes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlphaBeta {
    pub alpha: f64,
    pub beta: f64,
}

impl AlphaBeta {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Quadrature (torque-producing) component at `theta_e`.
    #[inline]
    pub fn park_q(self, theta_e: f64) -> f64 {
        park_q(self.alpha, self.beta, theta_e)
    }

    /// Direct (flux) component at `theta_e`.
    #[inline]
    pub fn park_d(self, theta_e: f64) -> f64 {
        park_d(self.alpha, self.beta, theta_e)
    }

    /// Magnitude of the current vector; frame invariant.
    pub fn magnitude(self) -> f64 {
        self.alpha.hypot(self.beta)
    }
}

/// Two-phase Clarke transform.
///
/// ```
/// use exotorque_core::transforms::clarke;
///
/// // Balanced currents: I_b = -I_a / 2
/// let ab = clarke(4.0, -2.0);
/// assert_eq!(ab.alpha, 4.0);
/// assert!(ab.beta.abs() < 1e-12);
/// ```
#[inline]
pub fn clarke(i_a: f64, i_b: f64) -> AlphaBeta {
    AlphaBeta {
        alpha: i_a,
        beta: (i_a + 2.0 * i_b) / 3.0_f64.sqrt(),
    }
}

/// Park transform, q-axis only.
///
/// `theta_e` is the electrical angle in radians. Any finite angle works;
/// values outside `[0, 2π)` give the same result as their wrapped form.
#[inline]
pub fn park_q(alpha: f64, beta: f64, theta_e: f64) -> f64 {
    let (sin, cos) = theta_e.sin_cos();
    -alpha * sin + beta * cos
}

/// Park transform, d-axis only. Not used on the torque path.
#[inline]
pub fn park_d(alpha: f64, beta: f64, theta_e: f64) -> f64 {
    let (sin, cos) = theta_e.sin_cos();
    alpha * cos + beta * sin
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(std::f64::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_clarke_balanced() {
        let ab = clarke(10.0, -5.0);
        assert_relative_eq!(ab.alpha, 10.0);
        assert!(ab.beta.abs() < 1e-12);
    }

    #[test]
    fn test_clarke_beta_only() {
        // I_a = 0, I_b = x gives beta = 2x / √3
        let ab = clarke(0.0, 3.0);
        assert_relative_eq!(ab.beta, 6.0 / 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_park_at_zero_angle() {
        assert_eq!(park_q(7.0, 0.0, 0.0), 0.0);
        assert_eq!(park_q(0.0, 2.5, 0.0), 2.5);
        assert_eq!(park_d(7.0, 0.0, 0.0), 7.0);
    }

    #[test]
    fn test_park_quarter_turn() {
        assert_relative_eq!(park_q(3.0, 0.0, FRAC_PI_2), -3.0, epsilon = 1e-12);
        assert_relative_eq!(park_d(0.0, 3.0, FRAC_PI_2), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_park_angle_wrap() {
        let ab = AlphaBeta::new(1.3, -0.4);
        assert_relative_eq!(ab.park_q(0.0), ab.park_q(TAU), epsilon = 1e-12);
        assert_relative_eq!(ab.park_q(PI / 3.0), ab.park_q(PI / 3.0 + TAU), epsilon = 1e-12);
    }

    #[test]
    fn test_park_preserves_magnitude() {
        let ab = AlphaBeta::new(2.0, -1.5);
        for step in 0..16 {
            let theta = f64::from(step) * TAU / 16.0;
            let d = ab.park_d(theta);
            let q = ab.park_q(theta);
            assert_relative_eq!(d.hypot(q), ab.magnitude(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert_relative_eq!(wrap_angle(-FRAC_PI_2), 3.0 * FRAC_PI_2, epsilon = 1e-12);
        assert!(wrap_angle(-1e-18) < TAU);
    }
}
