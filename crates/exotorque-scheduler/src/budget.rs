//! Worst-case execution time tracking for the periodic step.

use std::time::Duration;

/// Execution time of the estimation step measured against a fixed budget.
///
/// The budget is the share of the control period the step may use. A step
/// over budget is still allowed to finish; the scheduler then drops any
/// slots it ran into.
#[derive(Debug, Clone)]
pub struct ExecutionBudget {
    budget_ns: u64,
    last_ns: u64,
    max_ns: u64,
    ema_ns: f64,
    ema_alpha: f64,
    samples: u64,
    over_budget: u64,
}

impl ExecutionBudget {
    /// Default EMA smoothing factor.
    pub const DEFAULT_EMA_ALPHA: f64 = 0.01;

    pub fn new(budget_ns: u64) -> Self {
        Self {
            budget_ns: budget_ns.max(1),
            last_ns: 0,
            max_ns: 0,
            ema_ns: 0.0,
            ema_alpha: Self::DEFAULT_EMA_ALPHA,
            samples: 0,
            over_budget: 0,
        }
    }

    /// Budget as a fraction of `period_ns`, clamped to `(0, 1]`.
    pub fn fraction_of_period(period_ns: u64, fraction: f64) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(f64::EPSILON, 1.0)
        } else {
            1.0
        };
        Self::new((period_ns as f64 * fraction) as u64)
    }

    /// Record one step. Returns `true` when it stayed within budget.
    pub fn record(&mut self, elapsed: Duration) -> bool {
        let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);

        self.last_ns = elapsed_ns;
        self.max_ns = self.max_ns.max(elapsed_ns);
        self.ema_ns = if self.samples == 0 {
            elapsed_ns as f64
        } else {
            (1.0 - self.ema_alpha) * self.ema_ns + self.ema_alpha * elapsed_ns as f64
        };
        self.samples += 1;

        let within = elapsed_ns <= self.budget_ns;
        if !within {
            self.over_budget += 1;
        }
        within
    }

    #[inline]
    pub fn budget_ns(&self) -> u64 {
        self.budget_ns
    }

    #[inline]
    pub fn last_ns(&self) -> u64 {
        self.last_ns
    }

    #[inline]
    pub fn max_ns(&self) -> u64 {
        self.max_ns
    }

    #[inline]
    pub fn ema_ns(&self) -> f64 {
        self.ema_ns
    }

    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[inline]
    pub fn over_budget_count(&self) -> u64 {
        self.over_budget
    }

    /// Worst observed step as a fraction of the budget.
    pub fn worst_utilization(&self) -> f64 {
        self.max_ns as f64 / self.budget_ns as f64
    }

    pub fn reset(&mut self) {
        *self = Self {
            ema_alpha: self.ema_alpha,
            ..Self::new(self.budget_ns)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_within_and_over_budget() {
        let mut budget = ExecutionBudget::new(50_000);

        assert!(budget.record(Duration::from_nanos(10_000)));
        assert!(!budget.record(Duration::from_nanos(60_000)));
        assert!(budget.record(Duration::from_nanos(50_000)));

        assert_eq!(budget.samples(), 3);
        assert_eq!(budget.over_budget_count(), 1);
        assert_eq!(budget.max_ns(), 60_000);
        assert_eq!(budget.last_ns(), 50_000);
    }

    #[test]
    fn test_first_sample_seeds_ema() {
        let mut budget = ExecutionBudget::new(1_000);
        budget.record(Duration::from_nanos(400));
        assert!((budget.ema_ns() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_fraction_of_period() {
        let budget = ExecutionBudget::fraction_of_period(100_000, 0.5);
        assert_eq!(budget.budget_ns(), 50_000);

        let budget = ExecutionBudget::fraction_of_period(100_000, f64::NAN);
        assert_eq!(budget.budget_ns(), 100_000);

        let budget = ExecutionBudget::fraction_of_period(100_000, 3.0);
        assert_eq!(budget.budget_ns(), 100_000);
    }

    #[test]
    fn test_worst_utilization() {
        let mut budget = ExecutionBudget::new(100);
        budget.record(Duration::from_nanos(150));
        assert!((budget.worst_utilization() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_budget() {
        let mut budget = ExecutionBudget::new(2_000);
        budget.record(Duration::from_nanos(5_000));
        budget.reset();

        assert_eq!(budget.budget_ns(), 2_000);
        assert_eq!(budget.samples(), 0);
        assert_eq!(budget.over_budget_count(), 0);
    }
}
