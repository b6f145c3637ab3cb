use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use chrono_tz::Tz;
use thiserror::Error;

use market::{HistoryWindow, MergePolicy, RetryPolicy, Symbol};

use crate::cli::Cli;
use crate::universe::{dedup_symbols, default_universe};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid bind address '{0}'")]
    InvalidBind(String),

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("{0}")]
    MergePolicy(String),

    #[error("invalid CORS origin '{0}'")]
    InvalidOrigin(String),

    #[error("symbol universe is empty")]
    EmptyUniverse,
}

/// Origins allowed to read the quote endpoints cross-site.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    fn parse(raw: &[String]) -> Result<Self, ConfigError> {
        let origins: Vec<&str> = raw
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.contains(&"*") {
            return Ok(Self::Any);
        }

        origins
            .into_iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,

    /// Deduplicated, in configured order.
    pub universe: Vec<Symbol>,

    /// Period between scheduled refresh cycles.
    pub refresh_interval: Duration,

    pub cors: CorsOrigins,

    // =========================
    // Upstream provider
    // =========================
    pub provider_url: String,

    /// Bound on a single history request; a timeout is a provider error.
    pub provider_timeout: Duration,

    pub retry: RetryPolicy,

    /// Lookback range and bar size requested per symbol.
    pub window: HistoryWindow,

    // =========================
    // Refresh cycle
    // =========================
    /// Max symbols fetched in parallel.
    pub fetch_concurrency: usize,

    pub timezone: Tz,

    pub merge_policy: MergePolicy,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let bind: SocketAddr = cli
            .bind
            .parse()
            .map_err(|_| ConfigError::InvalidBind(cli.bind.clone()))?;

        let universe = if cli.symbols.iter().all(|s| s.trim().is_empty()) {
            default_universe()
        } else {
            dedup_symbols(&cli.symbols)
        };
        if universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }

        if cli.refresh_interval_secs == 0 {
            return Err(ConfigError::Zero("refresh interval"));
        }
        if cli.retry_attempts == 0 {
            return Err(ConfigError::Zero("retry attempts"));
        }
        if cli.fetch_concurrency == 0 {
            return Err(ConfigError::Zero("fetch concurrency"));
        }
        if cli.provider_timeout_secs == 0 {
            return Err(ConfigError::Zero("provider timeout"));
        }

        let timezone: Tz = cli
            .timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(cli.timezone.clone()))?;

        let merge_policy = cli
            .merge_policy
            .parse::<MergePolicy>()
            .map_err(ConfigError::MergePolicy)?;

        Ok(Self {
            bind,
            universe,
            refresh_interval: Duration::from_secs(cli.refresh_interval_secs),
            cors: CorsOrigins::parse(&cli.allowed_origins)?,
            provider_url: cli.provider_url,
            provider_timeout: Duration::from_secs(cli.provider_timeout_secs),
            retry: RetryPolicy::new(
                cli.retry_attempts,
                Duration::from_secs(cli.retry_delay_secs),
            ),
            window: HistoryWindow {
                range: cli.lookback,
                interval: cli.granularity,
            },
            fetch_concurrency: cli.fetch_concurrency,
            timezone,
            merge_policy,
        })
    }
}
