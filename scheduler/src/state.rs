//! Cycle state and counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-cycle state machine: `Idle → Running → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Minimal counters for operational visibility.
///
/// Cloning shares the underlying counters.
#[derive(Clone, Debug, Default)]
pub struct SchedulerStats {
    pub cycles_started: Arc<AtomicU64>,
    pub cycles_published: Arc<AtomicU64>,
    pub cycles_empty: Arc<AtomicU64>,
    pub cycles_aborted: Arc<AtomicU64>,

    /// Ticks dropped because a cycle was still running
    pub ticks_skipped: Arc<AtomicU64>,
    /// Callers that attached to an already running cycle
    pub joins: Arc<AtomicU64>,
}

impl SchedulerStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
