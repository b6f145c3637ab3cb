use std::time::Duration;

use thiserror::Error;

/// Failures talking to the upstream history provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream error ({code}): {description}")]
    Upstream { code: String, description: String },

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Why a single symbol produced no metrics this cycle.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no data returned")]
    NoData,

    #[error("insufficient data: {valid} valid close(s), need 2")]
    InsufficientData { valid: usize },

    #[error("non-finite change (previous_close={previous_close}, current_price={current_price})")]
    InvalidMetrics {
        previous_close: f64,
        current_price: f64,
    },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl FetchError {
    /// Only transport/provider failures are worth another attempt;
    /// missing data will still be missing a few seconds later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

/// Failure of a whole refresh cycle.
///
/// `Clone` so a single coalesced cycle can hand its result to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no symbol produced data ({attempted} attempted)")]
    EmptyBatch { attempted: usize },

    #[error("refresh task aborted: {0}")]
    Aborted(String),
}
