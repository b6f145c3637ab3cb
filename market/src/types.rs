use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FetchError;

/// Exchange-qualified ticker, e.g. `RELIANCE.NS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One observation from the upstream history.
///
/// `close` is `None` when the provider reports a gap for that bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Bar open time (seconds since epoch)
    pub timestamp: i64,
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: i64, close: Option<f64>) -> Self {
        Self { timestamp, close }
    }
}

/// How much history to request per symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    /// Lookback range in provider notation (`5d`, `1mo`, ...)
    pub range: String,
    /// Bar size in provider notation (`1d`, `1h`, ...)
    pub interval: String,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            range: "5d".to_string(),
            interval: "1d".to_string(),
        }
    }
}

/// Per-symbol metrics served to clients.
///
/// Values are rounded to 2 decimal places once, at construction.
/// `percentage_change` is derived from the unrounded closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteMetrics {
    pub current_price: f64,
    pub previous_close: f64,
    pub percentage_change: f64,
}

impl QuoteMetrics {
    /// Builds metrics from the last two closes.
    ///
    /// Fails with [`FetchError::InvalidMetrics`] when the change would be
    /// NaN or infinite (zero / non-finite previous close).
    pub fn from_closes(previous_close: f64, current_price: f64) -> Result<Self, FetchError> {
        let invalid = || FetchError::InvalidMetrics {
            previous_close,
            current_price,
        };

        if !previous_close.is_finite() || !current_price.is_finite() || previous_close == 0.0 {
            return Err(invalid());
        }

        let change = (current_price - previous_close) / previous_close * 100.0;
        if !change.is_finite() {
            return Err(invalid());
        }

        Ok(Self {
            current_price: round2(current_price),
            previous_close: round2(previous_close),
            percentage_change: round2(change),
        })
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
