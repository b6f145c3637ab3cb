//! The refresh scheduler loop.
//!
//! On every tick it asks the gate to start a cycle. A tick that lands while
//! a cycle is still running is dropped, not queued.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::gate::RefreshGate;
use super::state::SchedulerStats;
use super::ticker::{IntervalTicker, Ticker};
use super::types::SchedulerConfig;

pub struct RefreshScheduler {
    cfg: SchedulerConfig,
    gate: Arc<RefreshGate>,
}

impl RefreshScheduler {
    pub fn new(cfg: SchedulerConfig, gate: Arc<RefreshGate>) -> Self {
        Self { cfg, gate }
    }

    /// The production ticker for this configuration.
    pub fn interval_ticker(&self) -> IntervalTicker {
        IntervalTicker::new(self.cfg.interval)
    }

    /// Handles one tick. Returns `true` when it started a cycle.
    pub fn on_tick(&self) -> bool {
        let started = self.gate.try_start().is_some();
        if !started {
            debug!(
                skipped = SchedulerStats::get(&self.gate.stats().ticks_skipped),
                "refresh still running; tick skipped"
            );
        }
        started
    }

    /// Runs until `shutdown` flips (or its sender is dropped) or the
    /// ticker is exhausted. An in-flight cycle is left to finish on its own
    /// task.
    pub async fn run<T: Ticker>(self, mut ticker: T, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.cfg.interval.as_secs(),
            "refresh scheduler started"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => break,

                alive = ticker.tick() => {
                    if !alive {
                        break;
                    }
                    self.on_tick();
                }
            }
        }

        info!("refresh scheduler stopped");
    }
}
