//! Timer abstraction so the scheduler loop can be driven by tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};

#[async_trait]
pub trait Ticker: Send {
    /// Resolves at the next tick; `false` once the ticker is exhausted.
    async fn tick(&mut self) -> bool;
}

/// Fixed-period ticker. The first tick completes immediately, which gives
/// the refresh-at-startup behaviour for free.
pub struct IntervalTicker {
    inner: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut inner = interval(period);
        // A long cycle must not cause a burst of catch-up ticks
        inner.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { inner }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.inner.tick().await;
        true
    }
}

/// Ticks whenever a unit is sent; ends when every sender is dropped.
pub struct ChannelTicker {
    rx: mpsc::Receiver<()>,
}

impl ChannelTicker {
    pub fn new(buffer: usize) -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
