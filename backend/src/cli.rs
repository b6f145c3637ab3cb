use clap::Parser;

pub const DEFAULT_ORIGIN: &str = "https://gleaming-lokum-2106f6.netlify.app";

/// Command line flags. Every flag falls back to an environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "quote-snapshot", version, about = "Periodically refreshed quote snapshot over HTTP")]
pub struct Cli {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: String,

    /// Comma separated symbol universe (built-in NSE list when empty)
    #[arg(long, env = "SYMBOLS", value_delimiter = ',')]
    pub symbols: Vec<String>,

    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 120)]
    pub refresh_interval_secs: u64,

    /// Comma separated CORS origins; `*` allows any origin
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', default_value = DEFAULT_ORIGIN)]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "PROVIDER_URL", default_value = "https://query1.finance.yahoo.com")]
    pub provider_url: String,

    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 10)]
    pub provider_timeout_secs: u64,

    /// Attempts per symbol, including the first
    #[arg(long, env = "RETRY_ATTEMPTS", default_value_t = 3)]
    pub retry_attempts: u32,

    #[arg(long, env = "RETRY_DELAY_SECS", default_value_t = 5)]
    pub retry_delay_secs: u64,

    /// Max symbols fetched in parallel; 1 is sequential
    #[arg(long, env = "FETCH_CONCURRENCY", default_value_t = 10)]
    pub fetch_concurrency: usize,

    #[arg(long, env = "LOOKBACK_RANGE", default_value = "5d")]
    pub lookback: String,

    #[arg(long, env = "GRANULARITY", default_value = "1d")]
    pub granularity: String,

    /// IANA timezone used for `last_updated`
    #[arg(long, env = "TIMEZONE", default_value = "Asia/Kolkata")]
    pub timezone: String,

    /// `replace` or `carry-forward`
    #[arg(long, env = "MERGE_POLICY", default_value = "replace")]
    pub merge_policy: String,

    /// Emit JSON logs
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}
