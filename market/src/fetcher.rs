//! Quote Fetcher
//!
//! Turns one symbol's recent close history into [`QuoteMetrics`].
//! Failures stay local to the symbol; retry with a fixed delay applies only
//! to provider errors, so a flaky symbol never delays data it does not own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::errors::{FetchError, ProviderError};
use crate::provider::HistoryProvider;
use crate::types::{HistoryWindow, PricePoint, QuoteMetrics, Symbol};

/// Bounded retry for provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (min 1).
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

/// Anything that can produce metrics for one symbol.
///
/// The batch refresher only depends on this seam, so tests can script
/// per-symbol outcomes without a provider.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self, symbol: &Symbol) -> Result<QuoteMetrics, FetchError>;
}

pub struct QuoteFetcher {
    provider: Arc<dyn HistoryProvider>,
    window: HistoryWindow,
    timeout: Duration,
    retry: RetryPolicy,
}

impl QuoteFetcher {
    pub fn new(
        provider: Arc<dyn HistoryProvider>,
        window: HistoryWindow,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            window,
            timeout,
            retry,
        }
    }

    async fn fetch_once(&self, symbol: &Symbol) -> Result<QuoteMetrics, FetchError> {
        let history = self.provider.fetch_history(symbol, &self.window);

        let points = match tokio::time::timeout(self.timeout, history).await {
            Ok(res) => res?,
            Err(_) => return Err(ProviderError::Timeout(self.timeout).into()),
        };

        derive_metrics(&points)
    }
}

#[async_trait]
impl QuoteSource for QuoteFetcher {
    #[instrument(skip(self), fields(symbol = %symbol), level = "debug")]
    async fn fetch(&self, symbol: &Symbol) -> Result<QuoteMetrics, FetchError> {
        let mut attempt = 1;

        loop {
            match self.fetch_once(symbol).await {
                Ok(metrics) => {
                    debug!(
                        attempt,
                        current_price = metrics.current_price,
                        percentage_change = metrics.percentage_change,
                        "quote fetched"
                    );
                    return Ok(metrics);
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        error = %e,
                        "provider error; retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Derives metrics from an ordered history.
///
/// The last two finite closes become `current_price` and `previous_close`;
/// missing bars are skipped rather than treated as zero.
pub fn derive_metrics(points: &[PricePoint]) -> Result<QuoteMetrics, FetchError> {
    if points.is_empty() {
        return Err(FetchError::NoData);
    }

    let closes: Vec<f64> = points
        .iter()
        .filter_map(|p| p.close)
        .filter(|c| c.is_finite())
        .collect();

    let &[.., previous_close, current_price] = closes.as_slice() else {
        return Err(FetchError::InsufficientData {
            valid: closes.len(),
        });
    };

    QuoteMetrics::from_closes(previous_close, current_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn pts(closes: &[Option<f64>]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::new(1_700_000_000 + i as i64 * 86_400, *c))
            .collect()
    }

    /// Replays scripted responses, then repeats the last one.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<Vec<PricePoint>, ProviderError>>>,
        calls: AtomicU32,
        hang: bool,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<Vec<PricePoint>, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
                hang: false,
            })
        }

        fn hanging() -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(VecDeque::new()),
                calls: AtomicU32::new(0),
                hang: true,
            })
        }
    }

    #[async_trait]
    impl HistoryProvider for ScriptedProvider {
        async fn fetch_history(
            &self,
            _symbol: &Symbol,
            _window: &HistoryWindow,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                match script.front() {
                    Some(Ok(p)) => Ok(p.clone()),
                    Some(Err(_)) | None => Err(ProviderError::InvalidResponse("scripted".into())),
                }
            }
        }
    }

    fn fetcher(provider: Arc<ScriptedProvider>, retry: RetryPolicy) -> QuoteFetcher {
        QuoteFetcher::new(
            provider,
            HistoryWindow::default(),
            Duration::from_secs(10),
            retry,
        )
    }

    #[test]
    fn empty_history_is_no_data() {
        assert!(matches!(derive_metrics(&[]), Err(FetchError::NoData)));
    }

    #[test]
    fn fewer_than_two_valid_closes_is_insufficient() {
        let points = pts(&[None, Some(10.0), Some(f64::NAN), None]);

        match derive_metrics(&points) {
            Err(FetchError::InsufficientData { valid }) => assert_eq!(valid, 1),
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn uses_last_two_valid_closes() {
        let points = pts(&[Some(90.0), Some(100.0), None, Some(105.0), None]);
        let m = derive_metrics(&points).unwrap();

        assert_eq!(m.previous_close, 100.0);
        assert_eq!(m.current_price, 105.0);
        assert_eq!(m.percentage_change, 5.0);
    }

    #[test]
    fn zero_previous_close_is_a_fetch_failure() {
        let points = pts(&[Some(0.0), Some(12.0)]);
        assert!(matches!(
            derive_metrics(&points),
            Err(FetchError::InvalidMetrics { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_provider_errors_then_succeeds() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::InvalidResponse("boom".into())),
            Err(ProviderError::InvalidResponse("boom".into())),
            Ok(pts(&[Some(50.0), Some(45.0)])),
        ]);
        let f = fetcher(
            Arc::clone(&provider),
            RetryPolicy::new(3, Duration::from_secs(5)),
        );

        let started = tokio::time::Instant::now();
        let m = f.fetch(&Symbol::from("ACC.NS")).await.unwrap();

        assert_eq!(m.percentage_change, -10.0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts_with_last_error() {
        let provider = ScriptedProvider::new(vec![Err(ProviderError::Upstream {
            code: "500".into(),
            description: "down".into(),
        })]);
        let f = fetcher(
            Arc::clone(&provider),
            RetryPolicy::new(3, Duration::from_secs(5)),
        );

        let err = f.fetch(&Symbol::from("ACC.NS")).await.unwrap_err();

        assert!(matches!(err, FetchError::Provider(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_data_is_not_retried() {
        let provider = ScriptedProvider::new(vec![Ok(vec![])]);
        let f = fetcher(Arc::clone(&provider), RetryPolicy::default());

        let err = f.fetch(&Symbol::from("ZOMATO.NS")).await.unwrap_err();

        assert!(matches!(err, FetchError::NoData));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out_as_provider_error() {
        let provider = ScriptedProvider::hanging();
        let f = QuoteFetcher::new(
            Arc::clone(&provider) as Arc<dyn HistoryProvider>,
            HistoryWindow::default(),
            Duration::from_secs(2),
            RetryPolicy::new(2, Duration::from_secs(1)),
        );

        let err = f.fetch(&Symbol::from("TCS.NS")).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Provider(ProviderError::Timeout(d)) if d == Duration::from_secs(2)
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
