//! Periodic control loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use exotorque_core::config::ControlConfig;
use exotorque_core::hal::{AngleProvider, PhaseSampler, TorqueSink};
use exotorque_core::RunningEstimator;
use exotorque_errors::RTResult;
use exotorque_scheduler::{AbsoluteScheduler, TimingPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// When the loop should stop on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    pub max_ticks: Option<u64>,
    pub max_duration: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TickLimit,
    Duration,
    StopRequested,
}

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub elapsed_ms: f64,
    pub ticks: u64,
    pub steps: u64,
    pub dropped_ticks: u64,
    pub late_ticks: u64,
    pub over_budget_steps: u64,
    pub max_jitter_ns: u64,
    pub p50_jitter_ns: u64,
    pub p99_jitter_ns: u64,
    pub max_step_ns: u64,
    pub ema_step_ns: f64,
    pub last_joint_torque_nm: Option<f64>,
}

/// Build the scheduler described by a control section.
pub fn scheduler_for(control: &ControlConfig) -> AbsoluteScheduler {
    AbsoluteScheduler::with_frequency(control.frequency_hz)
        .with_budget_fraction(control.execution_budget_fraction)
        .with_policy(TimingPolicy {
            max_jitter_ns: control.max_jitter_us.map(|us| us.saturating_mul(1_000)),
            fail_on_overrun: control.fail_on_overrun,
        })
}

/// Run `estimator` once per scheduler tick until a limit is hit or `stop`
/// is set.
///
/// # Errors
///
/// The first estimation step failure, or a timing violation the scheduler
/// policy makes fatal. Either ends the run; nothing is retried.
pub fn run<S, A, O>(
    estimator: &mut RunningEstimator<S, A, O>,
    scheduler: &mut AbsoluteScheduler,
    limits: RunLimits,
    stop: &AtomicBool,
) -> RTResult<RunSummary>
where
    S: PhaseSampler,
    A: AngleProvider,
    O: TorqueSink,
{
    let started = Instant::now();
    let steps_before = estimator.steps();
    let progress_every = 1_000_000_000 / scheduler.period_ns().max(1);
    let mut last_joint_torque_nm = None;

    info!(
        period_ns = scheduler.period_ns(),
        budget_ns = scheduler.budget().budget_ns(),
        max_ticks = ?limits.max_ticks,
        max_duration = ?limits.max_duration,
        "control loop started"
    );

    let stop_reason = loop {
        if stop.load(Ordering::Relaxed) {
            break StopReason::StopRequested;
        }
        if let Some(max_ticks) = limits.max_ticks
            && scheduler.tick_count() >= max_ticks
        {
            break StopReason::TickLimit;
        }
        if let Some(max_duration) = limits.max_duration
            && started.elapsed() >= max_duration
        {
            break StopReason::Duration;
        }

        let tick = scheduler
            .wait_for_tick()
            .inspect_err(|e| error!(error = %e, code = e.code(), "timing policy violated"))?;
        if tick.overran() {
            warn!(
                tick = tick.tick,
                dropped = tick.dropped,
                "estimation overran its period; ticks dropped"
            );
        }

        let step_started = Instant::now();
        let estimate = estimator.step().inspect_err(|e| {
            error!(error = %e, code = e.code(), tick = tick.tick, "estimation step failed")
        })?;
        let within_budget = scheduler.record_execution(step_started.elapsed());
        if !within_budget {
            debug!(
                tick = tick.tick,
                step_ns = scheduler.budget().last_ns(),
                "step over execution budget"
            );
        }

        last_joint_torque_nm = Some(estimate.joint_torque_nm);
        if progress_every > 0 && tick.tick % progress_every == 0 {
            debug!(
                tick = tick.tick,
                joint_torque_nm = estimate.joint_torque_nm,
                i_q = estimate.i_q,
                "estimation progress"
            );
        }
    };

    let (p50_jitter_ns, p99_jitter_ns) = {
        let metrics = scheduler.metrics_mut();
        (metrics.p50_jitter_ns(), metrics.p99_jitter_ns())
    };
    let metrics = scheduler.metrics();
    let budget = scheduler.budget();
    let summary = RunSummary {
        stop_reason,
        elapsed_ms: started.elapsed().as_secs_f64() * 1_000.0,
        ticks: metrics.total_ticks,
        steps: estimator.steps() - steps_before,
        dropped_ticks: metrics.dropped_ticks,
        late_ticks: metrics.missed_ticks,
        over_budget_steps: budget.over_budget_count(),
        max_jitter_ns: metrics.max_jitter_ns,
        p50_jitter_ns,
        p99_jitter_ns,
        max_step_ns: budget.max_ns(),
        ema_step_ns: budget.ema_ns(),
        last_joint_torque_nm,
    };

    info!(
        reason = ?summary.stop_reason,
        ticks = summary.ticks,
        dropped = summary.dropped_ticks,
        over_budget = summary.over_budget_steps,
        p99_jitter_ns = summary.p99_jitter_ns,
        max_step_ns = summary.max_step_ns,
        "control loop stopped"
    );
    Ok(summary)
}
