use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, SystemClock, TradeDispatcher};
use dispatch::{LogDispatcher, PlaceholderHooks};
use policy::TradingWindow;
use scheduler::{Scheduler, SchedulerSettings};

/// Webhook-driven trading signal bot.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Do not start the scheduler, even if ENABLE_SCHEDULER is set.
    #[arg(long)]
    no_scheduler: bool,

    /// Port for the webhook server [default: WEBHOOK_PORT or 5000]
    #[arg(long)]
    port: Option<u16>,

    /// Host for the webhook server [default: WEBHOOK_HOST or 0.0.0.0]
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // ── Logging ──────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(common::config::log_level_from_env()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();

    info!(version = env!("CARGO_PKG_VERSION"), "Trading webhook bot starting");

    let window = TradingWindow::from_config(&cfg);
    match window.hours() {
        Ok((start, end)) => info!(
            %start,
            %end,
            weekends = window.allow_weekend_trading,
            "Trading hours configured"
        ),
        Err(e) => warn!(
            error = %e,
            "Invalid trading hours format in settings, trading is not time-gated"
        ),
    }

    // ── Collaborators ─────────────────────────────────────────────────────────
    let dispatcher = Arc::new(LogDispatcher::new());
    let hooks = Arc::new(PlaceholderHooks::new());

    // ── Scheduler ─────────────────────────────────────────────────────────────
    let scheduler_enabled = cfg.enable_scheduler && !args.no_scheduler;
    let scheduler = Scheduler::new(
        SchedulerSettings::from_config(&cfg),
        hooks.clone(),
        Arc::new(SystemClock),
    );
    if scheduler_enabled {
        info!(
            interval_secs = scheduler.settings().interval.as_secs(),
            "Starting scheduler"
        );
        scheduler.start().await;
    } else {
        info!("Scheduler disabled");
    }

    // ── Webhook server ────────────────────────────────────────────────────────
    let host = args.host.unwrap_or_else(|| cfg.webhook_host.clone());
    let port = args.port.unwrap_or(cfg.webhook_port);
    let state = api::AppState::new(
        &cfg,
        dispatcher.clone() as Arc<dyn TradeDispatcher>,
        scheduler_enabled,
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    api::serve(state, &host, port, &cfg.webhook_endpoint, shutdown)
        .await
        .with_context(|| format!("webhook server on {host}:{port} failed"))?;

    scheduler.stop().await;
    info!(
        dispatched = dispatcher.dispatched(),
        evaluation_ticks_today = hooks.ticks_today(),
        daily_resets = hooks.resets(),
        "Shutdown complete"
    );
    Ok(())
}
