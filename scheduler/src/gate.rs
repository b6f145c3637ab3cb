//! Single-flight refresh gate.
//!
//! Both the periodic scheduler and the cold-start query path go through
//! here, so there is never more than one batch refresh in flight:
//!   • `try_start` (scheduler tick) does nothing while a cycle is running.
//!   • `refresh` (cold start) attaches to the running cycle, or starts one,
//!     and every waiter receives the same result.
//!
//! The cycle runs on its own task, so a waiter that goes away (e.g. an HTTP
//! client disconnecting) does not cancel a refresh others depend on.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{Instrument, error, info, warn};

use common::logger::{TraceId, root_span, warn_if_slow};
use market::{BatchRefresher, RefreshError, Snapshot, SnapshotStore};

use crate::state::{CycleState, SchedulerStats};

pub type CycleResult = Result<Arc<Snapshot>, RefreshError>;

/// Cloneable handle on a running cycle.
pub type CycleHandle = Shared<BoxFuture<'static, CycleResult>>;

pub struct RefreshGate {
    refresher: Arc<BatchRefresher>,
    slow_cycle: Duration,
    inflight: Mutex<Option<CycleHandle>>,
    stats: SchedulerStats,
}

/// Frees the in-flight slot when the cycle task finishes, panics, or is
/// dropped by a shutting-down runtime.
struct ClearSlot(Arc<RefreshGate>);

impl Drop for ClearSlot {
    fn drop(&mut self) {
        self.0.inflight.lock().take();
    }
}

impl RefreshGate {
    pub fn new(refresher: Arc<BatchRefresher>, slow_cycle: Duration) -> Arc<Self> {
        Arc::new(Self {
            refresher,
            slow_cycle,
            inflight: Mutex::new(None),
            stats: SchedulerStats::default(),
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        self.refresher.store()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn state(&self) -> CycleState {
        if self.inflight.lock().is_some() {
            CycleState::Running
        } else {
            CycleState::Idle
        }
    }

    /// Waits for a refresh, joining the one in flight if there is one.
    pub async fn refresh(self: &Arc<Self>) -> CycleResult {
        let cycle = {
            let mut slot = self.inflight.lock();
            match slot.as_ref() {
                Some(running) => {
                    SchedulerStats::bump(&self.stats.joins);
                    running.clone()
                }
                None => self.start_locked(&mut slot),
            }
        };

        cycle.await
    }

    /// Cold-start path: the current snapshot if there is one, otherwise
    /// the result of the running (or a new) cycle.
    ///
    /// The store is re-read under the slot lock. A cycle publishes before
    /// it frees the slot, so an empty slot with a cold store means nothing
    /// has been published yet.
    pub async fn refresh_if_cold(self: &Arc<Self>) -> CycleResult {
        let cycle = {
            let mut slot = self.inflight.lock();
            match slot.as_ref() {
                Some(running) => {
                    SchedulerStats::bump(&self.stats.joins);
                    running.clone()
                }
                None => match self.store().read() {
                    Some(snapshot) => return Ok(snapshot),
                    None => self.start_locked(&mut slot),
                },
            }
        };

        cycle.await
    }

    /// Starts a cycle unless one is already running (overlap-skip).
    ///
    /// The returned handle may be dropped; the cycle runs to completion
    /// regardless.
    pub fn try_start(self: &Arc<Self>) -> Option<CycleHandle> {
        let mut slot = self.inflight.lock();
        if slot.is_some() {
            SchedulerStats::bump(&self.stats.ticks_skipped);
            return None;
        }

        Some(self.start_locked(&mut slot))
    }

    /// Caller holds the slot lock, so the task cannot clear the slot before
    /// the handle is stored in it.
    fn start_locked(self: &Arc<Self>, slot: &mut Option<CycleHandle>) -> CycleHandle {
        let clear = ClearSlot(Arc::clone(self));
        let gate = Arc::clone(self);

        let task = tokio::spawn(async move {
            let _clear = clear;
            gate.run_cycle().await
        });

        let stats = self.stats.clone();
        let cycle = async move {
            match task.await {
                Ok(res) => res,
                Err(e) => {
                    SchedulerStats::bump(&stats.cycles_aborted);
                    error!(error = %e, "refresh task aborted");
                    Err(RefreshError::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared();

        *slot = Some(cycle.clone());
        cycle
    }

    async fn run_cycle(&self) -> CycleResult {
        let trace_id = TraceId::new();
        let span = root_span("refresh_cycle", &trace_id);

        async {
            SchedulerStats::bump(&self.stats.cycles_started);
            info!(
                universe = self.refresher.universe().len(),
                "refresh cycle started"
            );

            let res = warn_if_slow("refresh_cycle", self.slow_cycle, self.refresher.refresh()).await;

            match &res {
                Ok(snapshot) => {
                    SchedulerStats::bump(&self.stats.cycles_published);
                    info!(entries = snapshot.len(), "refresh cycle complete");
                }
                Err(e @ RefreshError::EmptyBatch { .. }) => {
                    SchedulerStats::bump(&self.stats.cycles_empty);
                    warn!(error = %e, "refresh cycle produced nothing; previous snapshot retained");
                }
                Err(e) => {
                    error!(error = %e, "refresh cycle failed");
                }
            }

            res
        }
        .instrument(span)
        .await
    }
}
