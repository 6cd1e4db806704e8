//! Property-based tests for the estimation math.

#[cfg(test)]
mod property_tests {
    use exotorque_core::config::{DriveConfig, EstimatorConfig, SensingConfig};
    use exotorque_core::transforms::{clarke, park_d, park_q};
    use exotorque_core::wire::{TorqueFrameDecoder, encode_torque};
    use exotorque_core::{PhaseOffsets, TorquePipeline};
    use proptest::prelude::*;
    use std::f64::consts::TAU;

    fn pipeline_with_offsets(a: f64, b: f64) -> TorquePipeline {
        TorquePipeline::new(
            SensingConfig::default(),
            DriveConfig::default(),
            PhaseOffsets::new(a, b),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        // --- Current conversion ---

        #[test]
        fn conversion_is_odd(raw in -4095.0f64..4095.0) {
            let sensing = SensingConfig::default();
            let pos = sensing.raw_to_current(raw);
            let neg = sensing.raw_to_current(-raw);
            prop_assert!((pos + neg).abs() <= 1e-12 * pos.abs().max(1.0));
        }

        #[test]
        fn conversion_is_linear(x in -2000.0f64..2000.0, y in -2000.0f64..2000.0) {
            let sensing = SensingConfig::default();
            let sum = sensing.raw_to_current(x + y);
            let parts = sensing.raw_to_current(x) + sensing.raw_to_current(y);
            prop_assert!((sum - parts).abs() <= 1e-9, "{} vs {}", sum, parts);
        }

        #[test]
        fn conversion_doubles(raw in -2000.0f64..2000.0) {
            let sensing = SensingConfig::default();
            let single = sensing.raw_to_current(raw);
            let double = sensing.raw_to_current(2.0 * raw);
            prop_assert!((double - 2.0 * single).abs() <= 1e-12 * double.abs().max(1.0));
        }

        #[test]
        fn raw_at_offset_gives_zero_current(offset_a in 0u32..=4095, offset_b in 0u32..=4095) {
            let pipeline = pipeline_with_offsets(f64::from(offset_a), f64::from(offset_b));
            let currents = pipeline.phase_currents(offset_a, offset_b);
            prop_assert_eq!(currents.a, 0.0);
            prop_assert_eq!(currents.b, 0.0);
        }

        // --- Clarke / Park ---

        #[test]
        fn balanced_currents_have_no_beta(i_a in -100.0f64..100.0) {
            let ab = clarke(i_a, -i_a / 2.0);
            prop_assert_eq!(ab.alpha, i_a);
            prop_assert!(ab.beta.abs() <= 1e-12);
        }

        #[test]
        fn park_is_a_rotation(
            alpha in -100.0f64..100.0,
            beta in -100.0f64..100.0,
            theta in 0.0f64..TAU,
        ) {
            let d = park_d(alpha, beta, theta);
            let q = park_q(alpha, beta, theta);
            let before = alpha.hypot(beta);
            prop_assert!((d.hypot(q) - before).abs() <= 1e-9 * before.max(1.0));
        }

        #[test]
        fn full_turn_does_not_change_iq(
            alpha in -100.0f64..100.0,
            beta in -100.0f64..100.0,
            theta in 0.0f64..TAU,
        ) {
            let q = park_q(alpha, beta, theta);
            let q_wrapped = park_q(alpha, beta, theta + TAU);
            prop_assert!((q - q_wrapped).abs() <= 1e-9 * q.abs().max(1.0));
        }

        // --- Whole pipeline ---

        #[test]
        fn estimate_is_deterministic(
            raw_a in 0u32..=4095,
            raw_b in 0u32..=4095,
            theta in 0.0f64..TAU,
        ) {
            let pipeline = pipeline_with_offsets(2048.0, 2047.5);
            prop_assert_eq!(
                pipeline.estimate(raw_a, raw_b, theta),
                pipeline.estimate(raw_a, raw_b, theta)
            );
        }

        #[test]
        fn joint_torque_scales_iq(
            raw_a in 0u32..=4095,
            raw_b in 0u32..=4095,
            theta in 0.0f64..TAU,
        ) {
            let pipeline = pipeline_with_offsets(2048.0, 2048.0);
            let estimate = pipeline.estimate(raw_a, raw_b, theta);
            let expected = estimate.i_q * pipeline.drive().joint_torque_per_amp();
            prop_assert!((estimate.joint_torque_nm - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }

        #[test]
        fn joint_torque_is_bounded_by_full_scale(
            raw_a in 0u32..=4095,
            raw_b in 0u32..=4095,
            theta in 0.0f64..TAU,
        ) {
            let pipeline = pipeline_with_offsets(2047.5, 2047.5);
            let estimate = pipeline.estimate(raw_a, raw_b, theta);
            // |I_q| <= |αβ| <= 2 * full scale current
            let bound = 2.0
                * pipeline.sensing().full_scale_current()
                * pipeline.drive().joint_torque_per_amp()
                * 1.000_001;
            prop_assert!(estimate.joint_torque_nm.abs() <= bound);
        }

        // --- Wire ---

        #[test]
        fn decoder_recovers_any_chunking(
            values in prop::collection::vec(-500.0f32..500.0, 1..32),
            chunk in 1usize..9,
        ) {
            let stream: Vec<u8> = values.iter().flat_map(|&v| encode_torque(v)).collect();
            let mut decoder = TorqueFrameDecoder::new();
            let mut out = Vec::new();
            for part in stream.chunks(chunk) {
                decoder.push(part, &mut out);
            }
            prop_assert_eq!(out, values);
        }

        // --- Config ---

        #[test]
        fn valid_efficiency_passes(eff in 0.01f64..=1.0) {
            let mut config = EstimatorConfig::default();
            config.drive.gear_efficiency = eff;
            prop_assert!(config.validate().is_ok());
        }
    }
}
