//! High-precision sleep with busy-spin tail.

use std::time::{Duration, Instant};

/// Sleeps with the OS timer until shortly before the target, then spins.
///
/// At 10 kHz the whole period is usually shorter than the spin tail, so the
/// loop effectively busy-waits. That is intended: OS sleep granularity is
/// coarser than the control period on most hosts.
#[derive(Debug, Clone)]
pub struct HybridSleep {
    spin_tail: Duration,
}

impl HybridSleep {
    /// Default spin tail (80 µs).
    pub const DEFAULT_SPIN_TAIL: Duration = Duration::from_micros(80);

    pub fn new() -> Self {
        Self::with_spin_tail(Self::DEFAULT_SPIN_TAIL)
    }

    pub fn with_spin_tail(spin_tail: Duration) -> Self {
        Self { spin_tail }
    }

    pub fn spin_tail(&self) -> Duration {
        self.spin_tail
    }

    /// Block until `target`. Returns immediately if it already passed.
    pub fn sleep_until(&self, target: Instant) {
        let now = Instant::now();
        if target <= now {
            return;
        }

        let remaining = target.duration_since(now);
        if remaining > self.spin_tail {
            std::thread::sleep(remaining.saturating_sub(self.spin_tail));
        }

        while Instant::now() < target {
            std::hint::spin_loop();
        }
    }
}

impl Default for HybridSleep {
    fn default() -> Self {
        Self::new()
    }
}
