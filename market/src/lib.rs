//! Market data side of the quote service.
//!
//! Upstream history → [`fetcher::QuoteFetcher`] → [`refresher::BatchRefresher`]
//! → [`snapshot::SnapshotStore`].

pub mod errors;
pub mod fetcher;
pub mod provider;
pub mod refresher;
pub mod snapshot;
pub mod types;
pub mod yahoo;

pub use errors::{FetchError, ProviderError, RefreshError};
pub use fetcher::{QuoteFetcher, QuoteSource, RetryPolicy};
pub use provider::HistoryProvider;
pub use refresher::{BatchRefresher, MergePolicy};
pub use snapshot::{Snapshot, SnapshotStore, SnapshotView};
pub use types::{HistoryWindow, PricePoint, QuoteMetrics, Symbol};
