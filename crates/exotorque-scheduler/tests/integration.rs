//! Integration tests for the scheduler crate.

use exotorque_scheduler::{
    AbsoluteScheduler, ExecutionBudget, HybridSleep, JitterMetrics, RTError, TimingPolicy,
};
use std::time::{Duration, Instant};

#[test]
fn test_scheduler_basic_timing() -> Result<(), RTError> {
    let mut scheduler = AbsoluteScheduler::with_frequency(1_000);
    let start = Instant::now();

    for expected in 1..=5 {
        let tick = scheduler.wait_for_tick()?;
        assert_eq!(tick.tick, expected);
    }

    // Four full periods separate the first and fifth tick.
    assert!(start.elapsed() >= Duration::from_millis(4));
    Ok(())
}

#[test]
fn test_grid_does_not_drift_with_short_steps() -> Result<(), RTError> {
    let mut scheduler = AbsoluteScheduler::with_frequency(2_000);
    let start = Instant::now();

    for _ in 0..20 {
        scheduler.wait_for_tick()?;
        let step = Instant::now();
        while step.elapsed() < Duration::from_micros(50) {
            std::hint::spin_loop();
        }
        scheduler.record_execution(step.elapsed());
    }

    // 19 periods of 500 µs, plus whatever the host adds; never less.
    assert!(start.elapsed() >= Duration::from_micros(9_500));
    assert_eq!(scheduler.budget().samples(), 20);
    Ok(())
}

#[test]
fn test_overrun_is_dropped_not_queued() -> Result<(), RTError> {
    let mut scheduler = AbsoluteScheduler::with_period(1_000_000);
    scheduler.wait_for_tick()?;

    std::thread::sleep(Duration::from_millis(6));
    let late = scheduler.wait_for_tick()?;
    assert!(late.overran());

    // The following tick waits for the grid again instead of bursting.
    let next = scheduler.wait_for_tick()?;
    assert_eq!(next.dropped, 0);
    assert_eq!(next.tick, 3);
    assert_eq!(scheduler.metrics().dropped_ticks, late.dropped);
    Ok(())
}

#[test]
fn test_strict_jitter_policy() -> Result<(), RTError> {
    let mut scheduler = AbsoluteScheduler::with_period(10_000_000).with_policy(TimingPolicy {
        max_jitter_ns: Some(1),
        fail_on_overrun: false,
    });
    scheduler.wait_for_tick()?;

    // Arrive 5 ms into a 10 ms period: not a whole period late, so nothing is
    // dropped, but the remainder is reported as jitter.
    std::thread::sleep(Duration::from_millis(15));
    assert_eq!(scheduler.wait_for_tick(), Err(RTError::TimingViolation));
    Ok(())
}

#[test]
fn test_jitter_metrics_accumulation() {
    let mut metrics = JitterMetrics::with_capacity(100);

    for i in 1..=100 {
        metrics.record_tick(i * 100, i % 10 == 0);
    }

    assert_eq!(metrics.total_ticks, 100);
    assert_eq!(metrics.missed_ticks, 10);
    assert_eq!(metrics.max_jitter_ns, 10_000);
    assert!((metrics.missed_tick_rate() - 0.1).abs() < 1e-10);
}

#[test]
fn test_budget_tracks_worst_case() {
    let mut budget = ExecutionBudget::fraction_of_period(100_000, 0.5);
    for us in [5, 12, 60, 7] {
        budget.record(Duration::from_micros(us));
    }
    assert_eq!(budget.max_ns(), 60_000);
    assert_eq!(budget.over_budget_count(), 1);
}

#[test]
fn test_custom_spin_tail() {
    let sleeper = HybridSleep::with_spin_tail(Duration::from_micros(200));
    assert_eq!(sleeper.spin_tail(), Duration::from_micros(200));

    let target = Instant::now() + Duration::from_millis(1);
    sleeper.sleep_until(target);
    assert!(Instant::now() >= target);
}
