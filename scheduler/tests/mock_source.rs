use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

use market::{
    BatchRefresher, FetchError, QuoteMetrics, QuoteSource, SnapshotStore, Symbol,
};
use scheduler::{RefreshGate, SchedulerStats};

/// Quote source whose outcome and pacing are controlled by the test.
#[derive(Default)]
pub struct MockSource {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub panic: AtomicBool,
    /// When set, every fetch waits for a permit first.
    pub hold: Option<Arc<Semaphore>>,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fetches block until the returned semaphore gets a permit.
    pub fn held() -> (Arc<Self>, Arc<Semaphore>) {
        let hold = Arc::new(Semaphore::new(0));
        let source = Arc::new(Self {
            hold: Some(Arc::clone(&hold)),
            ..Self::default()
        });
        (source, hold)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for MockSource {
    async fn fetch(&self, _symbol: &Symbol) -> Result<QuoteMetrics, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(hold) = &self.hold {
            let _permit = hold.acquire().await.unwrap();
        }
        if self.panic.load(Ordering::SeqCst) {
            panic!("quote source blew up");
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::NoData);
        }

        QuoteMetrics::from_closes(100.0, 101.5)
    }
}

pub fn gate_over(source: Arc<MockSource>, symbols: &[&str]) -> Arc<RefreshGate> {
    let universe: Vec<Symbol> = symbols.iter().map(|s| Symbol::from(*s)).collect();
    let refresher = BatchRefresher::new(
        source,
        universe,
        SnapshotStore::new(),
        4,
        chrono_tz::Asia::Kolkata,
    );
    RefreshGate::new(Arc::new(refresher), Duration::from_secs(60))
}

pub fn count(counter: &std::sync::atomic::AtomicU64) -> u64 {
    SchedulerStats::get(counter)
}

/// Polls `cond` until it holds, yielding to spawned tasks in between.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition never became true");
}
