use serde::Deserialize;

use crate::errors::ProviderError;
use crate::types::PricePoint;

/// Top level of `/v8/finance/chart/{symbol}`.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Absent when the range holds no bars
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteIndicator {
    /// Gaps come through as `null`
    #[serde(default)]
    pub close: Option<Vec<Option<f64>>>,
}

impl ChartEnvelope {
    /// Flattens the first result into ordered price points.
    ///
    /// A missing result is an empty history, not an error; an explicit
    /// `chart.error` is reported as [`ProviderError::Upstream`].
    pub fn into_points(self) -> Result<Vec<PricePoint>, ProviderError> {
        if let Some(err) = self.chart.error {
            return Err(ProviderError::Upstream {
                code: err.code,
                description: err.description,
            });
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };

        let timestamps = result.timestamp.unwrap_or_default();
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .unwrap_or_default();

        if closes.len() != timestamps.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "{} timestamps but {} closes",
                timestamps.len(),
                closes.len()
            )));
        }

        Ok(timestamps
            .into_iter()
            .zip(closes)
            .map(|(ts, close)| PricePoint::new(ts, close))
            .collect())
    }
}
