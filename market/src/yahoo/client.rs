use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::errors::ProviderError;
use crate::provider::HistoryProvider;
use crate::types::{HistoryWindow, PricePoint, Symbol};
use crate::yahoo::types::{Chart, ChartEnvelope};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Yahoo Finance chart API client.
#[derive(Clone)]
pub struct YahooClient {
    http: Client,
    base: Url,
}

impl YahooClient {
    /// `url` is the API root, e.g. `https://query1.finance.yahoo.com`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let base = Url::parse(url).map_err(|e| ProviderError::InvalidEndpoint(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ProviderError::InvalidEndpoint(url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base })
    }

    /// `{base}/v8/finance/chart/{symbol}`, with the symbol percent-encoded
    /// as a single path segment (tickers like `M&M.NS`).
    fn chart_url(&self, symbol: &Symbol) -> Result<Url, ProviderError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl HistoryProvider for YahooClient {
    #[instrument(
        skip(self, window),
        fields(symbol = %symbol, range = %window.range, interval = %window.interval),
        level = "debug"
    )]
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let url = self.chart_url(symbol)?;

        let resp = self
            .http
            .get(url)
            .query(&[
                ("range", window.range.as_str()),
                ("interval", window.interval.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        let parsed = serde_json::from_slice::<ChartEnvelope>(&body);

        // Any non-2xx is an upstream failure, whatever the body says.
        // Yahoo reports unknown symbols as 404 with a chart.error body.
        if !status.is_success() {
            let (code, description) = match parsed {
                Ok(ChartEnvelope {
                    chart: Chart {
                        error: Some(err), ..
                    },
                }) => (err.code, err.description),
                _ => (
                    status.as_u16().to_string(),
                    status.canonical_reason().unwrap_or("unknown").to_string(),
                ),
            };
            return Err(ProviderError::Upstream { code, description });
        }

        let envelope = parsed.map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let points = envelope.into_points()?;

        debug!(points = points.len(), "chart history fetched");

        Ok(points)
    }
}
