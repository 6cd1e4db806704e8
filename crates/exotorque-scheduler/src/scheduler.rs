//! Absolute scheduler for the fixed-rate estimation loop.

use crate::budget::ExecutionBudget;
use crate::jitter::JitterMetrics;
use crate::sleep::HybridSleep;
use exotorque_errors::{RTError, RTResult};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// What `wait_for_tick` reports about the slot it released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// Sequence number of this tick, starting at 1.
    pub tick: u64,
    /// Distance from the slot's deadline to the actual wake-up.
    pub jitter_ns: u64,
    /// Slots skipped before this one because the loop overran.
    pub dropped: u64,
}

impl TickInfo {
    #[inline]
    pub fn overran(&self) -> bool {
        self.dropped > 0
    }
}

/// Which timing anomalies `wait_for_tick` turns into errors.
///
/// The default only observes: overruns are dropped and counted, jitter is
/// measured, nothing fails. A deployment with a supervisory reset can opt in
/// to hard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingPolicy {
    /// Fail with `RTError::TimingViolation` above this jitter.
    pub max_jitter_ns: Option<u64>,
    /// Fail with `RTError::DeadlineMissed` when any slot is dropped.
    pub fail_on_overrun: bool,
}

/// Absolute scheduler on a fixed period grid.
///
/// Deadlines are `start + n * period`, never "now + period", so timing error
/// does not accumulate. If the caller comes back one or more whole periods
/// late, those slots are dropped and the grid is kept: nothing is queued and
/// there is no catch-up burst.
///
/// # Example
///
/// ```no_run
/// use exotorque_scheduler::AbsoluteScheduler;
/// use std::time::Instant;
///
/// let mut scheduler = AbsoluteScheduler::with_frequency(10_000);
///
/// for _ in 0..10_000 {
///     let _tick = scheduler.wait_for_tick().expect("timing policy violated");
///     let started = Instant::now();
///     // estimation step
///     scheduler.record_execution(started.elapsed());
/// }
/// ```
pub struct AbsoluteScheduler {
    period_ns: u64,

    /// Deadline of the next slot; `None` until the first tick arms the grid.
    next_tick: Option<Instant>,

    tick_count: u64,

    policy: TimingPolicy,

    metrics: JitterMetrics,

    budget: ExecutionBudget,

    sleeper: HybridSleep,
}

impl AbsoluteScheduler {
    /// Share of the period granted to the step when no budget is given.
    pub const DEFAULT_BUDGET_FRACTION: f64 = 0.5;

    /// Create a scheduler for `frequency_hz` ticks per second.
    ///
    /// # RT-Safety
    ///
    /// Allocates the jitter ring buffer. Call during initialization only.
    pub fn with_frequency(frequency_hz: u32) -> Self {
        Self::with_period(crate::period_ns_for(frequency_hz))
    }

    /// Create a scheduler with a custom period in nanoseconds.
    pub fn with_period(period_ns: u64) -> Self {
        let period_ns = period_ns.max(1);
        Self {
            period_ns,
            next_tick: None,
            tick_count: 0,
            policy: TimingPolicy::default(),
            metrics: JitterMetrics::new(),
            budget: ExecutionBudget::fraction_of_period(period_ns, Self::DEFAULT_BUDGET_FRACTION),
            sleeper: HybridSleep::new(),
        }
    }

    pub fn with_policy(mut self, policy: TimingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the execution budget, as a fraction of the period.
    pub fn with_budget_fraction(mut self, fraction: f64) -> Self {
        self.budget = ExecutionBudget::fraction_of_period(self.period_ns, fraction);
        self
    }

    pub fn with_sleeper(mut self, sleeper: HybridSleep) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Wait for the next slot on the grid.
    ///
    /// The first call arms the grid and returns at once. Later calls sleep
    /// until the next deadline, or, when the caller is already late, release
    /// the current slot immediately after dropping any whole periods that
    /// were missed.
    ///
    /// # Errors
    ///
    /// Only when the configured [`TimingPolicy`] asks for it:
    /// `RTError::DeadlineMissed` for a dropped slot, `RTError::TimingViolation`
    /// for excessive jitter. The tick is still counted and the grid advanced,
    /// so a caller that chooses to continue stays aligned.
    pub fn wait_for_tick(&mut self) -> RTResult<TickInfo> {
        let period = Duration::from_nanos(self.period_ns);

        let Some(deadline) = self.next_tick else {
            let now = Instant::now();
            self.next_tick = Some(now + period);
            self.tick_count = 1;
            self.metrics.record_tick(0, false);
            return Ok(TickInfo {
                tick: 1,
                jitter_ns: 0,
                dropped: 0,
            });
        };

        let now = Instant::now();
        let (deadline, jitter_ns, dropped, missed_deadline) = if now > deadline {
            let late_ns = saturating_nanos(now.duration_since(deadline));
            let dropped = late_ns / self.period_ns;
            let deadline = deadline + Duration::from_nanos(dropped * self.period_ns);
            let jitter_ns = late_ns - dropped * self.period_ns;
            (deadline, jitter_ns, dropped, true)
        } else {
            self.sleeper.sleep_until(deadline);
            let woke = Instant::now();
            (deadline, saturating_nanos(woke.duration_since(deadline)), 0, false)
        };

        self.metrics.record_tick(jitter_ns, missed_deadline);
        if dropped > 0 {
            self.metrics.record_dropped(dropped);
            trace!(dropped, late_ns = jitter_ns, "overrun; realigned to grid");
        }

        self.tick_count += 1;
        self.next_tick = Some(deadline + period);

        let info = TickInfo {
            tick: self.tick_count,
            jitter_ns,
            dropped,
        };

        if self.policy.fail_on_overrun && dropped > 0 {
            return Err(RTError::DeadlineMissed);
        }
        if let Some(max_jitter) = self.policy.max_jitter_ns
            && jitter_ns > max_jitter
        {
            return Err(RTError::TimingViolation);
        }

        Ok(info)
    }

    /// Report how long the step for the current tick took.
    ///
    /// Returns `true` when the step stayed within the execution budget.
    pub fn record_execution(&mut self, elapsed: Duration) -> bool {
        self.budget.record(elapsed)
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[inline]
    pub fn metrics(&self) -> &JitterMetrics {
        &self.metrics
    }

    /// Mutable access for percentile queries.
    #[inline]
    pub fn metrics_mut(&mut self) -> &mut JitterMetrics {
        &mut self.metrics
    }

    #[inline]
    pub fn budget(&self) -> &ExecutionBudget {
        &self.budget
    }

    #[inline]
    pub fn period_ns(&self) -> u64 {
        self.period_ns
    }

    #[inline]
    pub fn policy(&self) -> TimingPolicy {
        self.policy
    }

    /// Forget the grid and all statistics; the next tick re-arms.
    pub fn reset(&mut self) {
        debug!(ticks = self.tick_count, "scheduler reset");
        self.next_tick = None;
        self.tick_count = 0;
        self.metrics.reset();
        self.budget.reset();
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
