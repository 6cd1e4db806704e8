//! Property-based tests for offset calibration.

#[cfg(test)]
mod proptest_calibration {
    use exotorque_calibration::{
        MIN_CALIBRATION_SAMPLES, OffsetAccumulator, PhaseOffsets, calibrate_offsets,
    };
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        // --- A constant input reproduces itself exactly ---

        #[test]
        fn constant_input_yields_exact_offset(
            raw_a in 0u32..=4095,
            raw_b in 0u32..=4095,
            n in MIN_CALIBRATION_SAMPLES..4096,
        ) {
            let offsets = calibrate_offsets(n, || Ok((raw_a, raw_b)));
            prop_assert_eq!(
                offsets,
                Ok(PhaseOffsets::new(f64::from(raw_a), f64::from(raw_b)))
            );
        }

        // --- The mean stays inside the observed sample range ---

        #[test]
        fn mean_is_bounded_by_samples(samples in prop::collection::vec((0u32..=4095, 0u32..=4095), 1..512)) {
            let mut acc = OffsetAccumulator::new();
            for &(a, b) in &samples {
                acc.add(a, b);
            }
            let offsets = acc.finish().map_err(|e| TestCaseError::fail(e.to_string()))?;

            let min_a = samples.iter().map(|s| s.0).min().unwrap_or(0);
            let max_a = samples.iter().map(|s| s.0).max().unwrap_or(0);
            prop_assert!(offsets.a >= f64::from(min_a));
            prop_assert!(offsets.a <= f64::from(max_a));

            let min_b = samples.iter().map(|s| s.1).min().unwrap_or(0);
            let max_b = samples.iter().map(|s| s.1).max().unwrap_or(0);
            prop_assert!(offsets.b >= f64::from(min_b));
            prop_assert!(offsets.b <= f64::from(max_b));
        }

        // --- Deviation is a fraction of full scale ---

        #[test]
        fn midscale_deviation_in_unit_range(a in 0u32..=4095, b in 0u32..=4095) {
            let offsets = PhaseOffsets::new(f64::from(a), f64::from(b));
            let dev = offsets.midscale_deviation(4095);
            prop_assert!((0.0..=0.5).contains(&dev), "deviation {} outside [0, 0.5]", dev);
        }
    }
}
