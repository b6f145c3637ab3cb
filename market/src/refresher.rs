//! Batch Refresher
//!
//! Fans the fetcher out over the universe with a fixed concurrency limit,
//! waits for every symbol, then builds and publishes one new snapshot.
//!
//! Data flow:
//! Universe → QuoteSource (×N, bounded) → working set → SnapshotStore

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use futures::{StreamExt, stream};
use tracing::{Instrument, info, warn};

use common::logger::child_span;

use crate::errors::{FetchError, RefreshError};
use crate::fetcher::QuoteSource;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::types::{QuoteMetrics, Symbol};

/// What happens to symbols that fail in the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Each cycle starts from an empty working set; failed symbols vanish.
    #[default]
    Replace,
    /// Failed symbols keep the entry from the currently published snapshot.
    CarryForward,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "carry-forward" | "carry_forward" => Ok(Self::CarryForward),
            other => Err(format!(
                "unknown merge policy '{other}' (expected replace|carry-forward)"
            )),
        }
    }
}

pub struct BatchRefresher {
    source: Arc<dyn QuoteSource>,
    universe: Arc<[Symbol]>,
    store: SnapshotStore,
    /// Max fetches in flight; 1 means strictly sequential.
    concurrency: usize,
    timezone: Tz,
    merge: MergePolicy,
}

impl BatchRefresher {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        universe: impl Into<Arc<[Symbol]>>,
        store: SnapshotStore,
        concurrency: usize,
        timezone: Tz,
    ) -> Self {
        Self {
            source,
            universe: universe.into(),
            store,
            concurrency: concurrency.max(1),
            timezone,
            merge: MergePolicy::default(),
        }
    }

    pub fn with_merge_policy(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }

    pub fn universe(&self) -> &[Symbol] {
        &self.universe
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Runs one full cycle and publishes the result.
    ///
    /// On [`RefreshError::EmptyBatch`] the store is not touched, so the
    /// previously published snapshot stays visible.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let started = tokio::time::Instant::now();
        let previous = self.store.read();

        let snapshot = self.build_snapshot(previous.as_deref()).await?;
        let published = self.store.publish(snapshot);

        info!(
            entries = published.len(),
            universe = self.universe.len(),
            skipped = self.universe.len().saturating_sub(published.len()),
            last_updated = %published.last_updated_display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot published"
        );

        Ok(published)
    }

    /// Fetches every symbol and assembles a snapshot without publishing it.
    pub async fn build_snapshot(
        &self,
        previous: Option<&Snapshot>,
    ) -> Result<Snapshot, RefreshError> {
        let results = self.fetch_all().await;

        let mut working: BTreeMap<Symbol, QuoteMetrics> = BTreeMap::new();
        let mut failed = Vec::new();

        for (symbol, res) in results {
            match res {
                Ok(metrics) => {
                    working.insert(symbol, metrics);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "symbol skipped this cycle");
                    failed.push(symbol);
                }
            }
        }

        if working.is_empty() {
            warn!(
                attempted = self.universe.len(),
                "no symbol produced data; keeping previous snapshot"
            );
            return Err(RefreshError::EmptyBatch {
                attempted: self.universe.len(),
            });
        }

        if let (MergePolicy::CarryForward, Some(prev)) = (self.merge, previous) {
            for symbol in &failed {
                if let Some(stale) = prev.get(symbol) {
                    working.insert(symbol.clone(), *stale);
                }
            }
        }

        if !failed.is_empty() {
            info!(
                failed = failed.len(),
                merge = ?self.merge,
                "partial refresh"
            );
        }

        let now = Utc::now().with_timezone(&self.timezone);
        Ok(Snapshot::new(working, now))
    }

    /// Join-before-aggregate: returns only once every dispatched fetch is done.
    async fn fetch_all(&self) -> Vec<(Symbol, Result<QuoteMetrics, FetchError>)> {
        stream::iter(self.universe.iter().cloned())
            .map(|symbol| {
                let source = Arc::clone(&self.source);
                let span = child_span("fetch_quote");
                span.record("symbol", tracing::field::display(&symbol));
                async move {
                    let res = source.fetch(&symbol).await;
                    (symbol, res)
                }
                .instrument(span)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}
