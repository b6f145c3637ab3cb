use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::watch;

use backend::{
    cli::Cli,
    config::AppConfig,
    http::{AppState, create_router},
    query::QueryService,
};
use common::logger::init_logger;
use market::{BatchRefresher, QuoteFetcher, SnapshotStore, yahoo::YahooClient};
use scheduler::{RefreshGate, RefreshScheduler, SchedulerConfig};

/// Wires provider → fetcher → refresher → gate around an empty store.
fn build_gate(cfg: &AppConfig, sched: &SchedulerConfig) -> anyhow::Result<Arc<RefreshGate>> {
    let provider = YahooClient::new(&cfg.provider_url, cfg.provider_timeout)
        .with_context(|| format!("building provider client for {}", cfg.provider_url))?;

    let fetcher = QuoteFetcher::new(
        Arc::new(provider),
        cfg.window.clone(),
        cfg.provider_timeout,
        cfg.retry,
    );

    let refresher = BatchRefresher::new(
        Arc::new(fetcher),
        cfg.universe.clone(),
        SnapshotStore::new(),
        cfg.fetch_concurrency,
        cfg.timezone,
    )
    .with_merge_policy(cfg.merge_policy);

    Ok(RefreshGate::new(Arc::new(refresher), sched.slow_cycle))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger("quote-snapshot", cli.log_json);

    let cfg = AppConfig::from_cli(cli).context("invalid configuration")?;

    tracing::info!(
        bind = %cfg.bind,
        universe = cfg.universe.len(),
        interval_secs = cfg.refresh_interval.as_secs(),
        timezone = %cfg.timezone,
        merge = ?cfg.merge_policy,
        "Starting quote snapshot service..."
    );

    let sched_cfg = SchedulerConfig::new(cfg.refresh_interval);
    let gate = build_gate(&cfg, &sched_cfg)?;

    // First interval tick fires immediately: refresh at startup
    let scheduler = RefreshScheduler::new(sched_cfg, Arc::clone(&gate));
    let ticker = scheduler.interval_ticker();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(scheduler.run(ticker, shutdown_rx));

    let app = create_router(AppState::new(QueryService::new(gate)), &cfg.cors);

    let listener = TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    tracing::info!(addr = %cfg.bind, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Receiver gone only if the scheduler already exited
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        tracing::warn!(error = %e, "scheduler task ended abnormally");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
