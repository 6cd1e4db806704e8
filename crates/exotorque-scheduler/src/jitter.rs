//! Jitter metrics collection and analysis.

use std::vec::Vec;

/// Wake-up jitter statistics for the control loop.
///
/// Tracks:
/// - Total, late and dropped ticks
/// - Maximum and mean jitter
/// - Percentiles over a bounded window of recent samples
///
/// # RT-Safety
///
/// - `record_tick` is O(1) and never allocates once the ring buffer is full
/// - Percentile queries reuse a scratch buffer and belong outside the loop
#[derive(Debug, Clone)]
pub struct JitterMetrics {
    /// Total number of ticks recorded
    pub total_ticks: u64,

    /// Number of ticks that woke after their deadline
    pub missed_ticks: u64,

    /// Number of tick slots skipped because the loop overran
    pub dropped_ticks: u64,

    /// Maximum observed jitter in nanoseconds
    pub max_jitter_ns: u64,

    /// Last observed jitter sample
    pub last_jitter_ns: u64,

    jitter_sum_ns: u128,

    /// Recent jitter samples for percentile calculation (ring buffer)
    recent_jitter_samples: Vec<u64>,

    max_samples: usize,

    next_sample_index: usize,

    percentile_scratch: Vec<u64>,
}

impl Default for JitterMetrics {
    fn default() -> Self {
        const DEFAULT_MAX_SAMPLES: usize = 10_000;
        Self::with_capacity(DEFAULT_MAX_SAMPLES)
    }
}

impl JitterMetrics {
    /// Create new jitter metrics collector with default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create jitter metrics retaining at most `max_samples` recent samples.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            total_ticks: 0,
            missed_ticks: 0,
            dropped_ticks: 0,
            max_jitter_ns: 0,
            last_jitter_ns: 0,
            jitter_sum_ns: 0,
            recent_jitter_samples: Vec::with_capacity(max_samples),
            max_samples,
            next_sample_index: 0,
            percentile_scratch: Vec::with_capacity(max_samples),
        }
    }

    /// Record a tick with its jitter measurement.
    pub fn record_tick(&mut self, jitter_ns: u64, missed_deadline: bool) {
        self.total_ticks += 1;

        if missed_deadline {
            self.missed_ticks += 1;
        }

        self.max_jitter_ns = self.max_jitter_ns.max(jitter_ns);
        self.jitter_sum_ns += u128::from(jitter_ns);
        self.last_jitter_ns = jitter_ns;

        if self.max_samples == 0 {
            return;
        }

        if self.recent_jitter_samples.len() < self.max_samples {
            self.recent_jitter_samples.push(jitter_ns);
            if self.recent_jitter_samples.len() == self.max_samples {
                self.next_sample_index = 0;
            }
        } else {
            self.recent_jitter_samples[self.next_sample_index] = jitter_ns;
            self.next_sample_index = (self.next_sample_index + 1) % self.max_samples;
        }
    }

    /// Record tick slots skipped by the overrun guard.
    pub fn record_dropped(&mut self, slots: u64) {
        self.dropped_ticks += slots;
    }

    /// Calculate p99 jitter in nanoseconds.
    pub fn p99_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.99)
    }

    /// Calculate p95 jitter in nanoseconds.
    pub fn p95_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.95)
    }

    /// Calculate p50 (median) jitter in nanoseconds.
    pub fn p50_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.50)
    }

    /// Calculate arbitrary percentile jitter in nanoseconds.
    ///
    /// `percentile` is clamped to `[0.0, 1.0]`. Returns 0 without samples.
    pub fn percentile_jitter_ns(&mut self, percentile: f64) -> u64 {
        if self.recent_jitter_samples.is_empty() {
            return 0;
        }

        let percentile = percentile.clamp(0.0, 1.0);

        self.percentile_scratch.clear();
        self.percentile_scratch
            .extend_from_slice(&self.recent_jitter_samples);

        let len = self.percentile_scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len.saturating_sub(1));
        let (_, value, _) = self.percentile_scratch.select_nth_unstable(index);
        *value
    }

    /// Mean jitter over every recorded tick, in nanoseconds.
    pub fn mean_jitter_ns(&self) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        self.jitter_sum_ns as f64 / self.total_ticks as f64
    }

    /// Fraction of ticks that woke late (0.0 to 1.0).
    pub fn missed_tick_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.missed_ticks as f64 / self.total_ticks as f64
        }
    }

    /// Check the recent window against a p99 bound and a late-tick rate.
    pub fn meets_requirements(&mut self, max_p99_jitter_ns: u64, max_missed_rate: f64) -> bool {
        self.p99_jitter_ns() <= max_p99_jitter_ns && self.missed_tick_rate() <= max_missed_rate
    }

    /// Reset all metrics.
    pub fn reset(&mut self) {
        self.total_ticks = 0;
        self.missed_ticks = 0;
        self.dropped_ticks = 0;
        self.max_jitter_ns = 0;
        self.last_jitter_ns = 0;
        self.jitter_sum_ns = 0;
        self.recent_jitter_samples.clear();
        self.next_sample_index = 0;
        self.percentile_scratch.clear();
    }

    /// Get the number of samples currently stored.
    pub fn sample_count(&self) -> usize {
        self.recent_jitter_samples.len()
    }
}
