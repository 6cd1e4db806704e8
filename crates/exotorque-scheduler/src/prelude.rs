//! Prelude module for common scheduler types.

pub use crate::budget::ExecutionBudget;
pub use crate::jitter::JitterMetrics;
pub use crate::scheduler::{AbsoluteScheduler, TickInfo, TimingPolicy};
pub use crate::sleep::HybridSleep;
pub use crate::{DEFAULT_CONTROL_FREQUENCY_HZ, PERIOD_10KHZ_NS, period_ns_for};
pub use exotorque_errors::{RTError, RTResult};
