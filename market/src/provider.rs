use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::types::{HistoryWindow, PricePoint, Symbol};

/// Source of per-symbol price history.
///
/// Implementations return observations oldest first. An unknown symbol may
/// surface either as an empty history or as a [`ProviderError`].
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}
