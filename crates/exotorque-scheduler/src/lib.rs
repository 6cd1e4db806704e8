//! Fixed-rate absolute scheduling for the torque estimation loop.
//!
//! The estimator runs one step per control period (10 kHz by default). This
//! crate provides the pieces around that step:
//!
//! - **AbsoluteScheduler**: absolute deadlines on a fixed grid, so timing
//!   error never accumulates. A tick that arrives one or more whole periods
//!   late drops the missed slots instead of queueing them.
//! - **JitterMetrics**: wake-up jitter with percentile estimation and
//!   missed/dropped tick counters.
//! - **ExecutionBudget**: per-step execution time against a worst-case
//!   budget.
//!
//! # RT-Safety Guarantees
//!
//! - **No heap allocations** in `wait_for_tick` after construction
//! - **Bounded execution time**: the final approach to a deadline busy-spins
//! - The scheduler is `&mut`-only; a single owner drives it, so a step can
//!   never be re-entered.
//!
//! # Example
//!
//! ```no_run
//! use exotorque_scheduler::AbsoluteScheduler;
//!
//! let mut scheduler = AbsoluteScheduler::with_frequency(10_000);
//!
//! loop {
//!     let tick = scheduler.wait_for_tick().expect("timing policy violated");
//!     if tick.dropped > 0 {
//!         // log the overrun, the missed slots are gone
//!     }
//!     // run one estimation step here
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod budget;
pub mod jitter;
pub mod scheduler;
pub mod sleep;

pub mod prelude;

pub use budget::ExecutionBudget;
pub use exotorque_errors::{RTError, RTResult};
pub use jitter::JitterMetrics;
pub use scheduler::{AbsoluteScheduler, TickInfo, TimingPolicy};
pub use sleep::HybridSleep;

/// Default control frequency of the estimation loop.
pub const DEFAULT_CONTROL_FREQUENCY_HZ: u32 = 10_000;

/// Target period for 10 kHz operation in nanoseconds (100 µs)
pub const PERIOD_10KHZ_NS: u64 = 100_000;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Period in nanoseconds for a frequency in hertz (at least 1 ns).
pub fn period_ns_for(frequency_hz: u32) -> u64 {
    (NANOS_PER_SEC / u64::from(frequency_hz.max(1))).max(1)
}
