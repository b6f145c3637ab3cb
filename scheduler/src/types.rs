//! Shared types used by the scheduler subsystem.

use std::time::Duration;

/// Configuration knobs for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period between refresh ticks. The first tick fires immediately.
    pub interval: Duration,

    /// A cycle slower than this logs a `performance` warning.
    /// Defaults to the interval: a cycle that outlives its period will
    /// cause the next tick to be skipped.
    pub slow_cycle: Duration,
}

impl SchedulerConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slow_cycle: interval,
        }
    }
}
