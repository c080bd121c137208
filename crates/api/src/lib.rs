pub mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use common::{Config, Error, Result, TradeDispatcher};
use signal::SignalValidator;

/// Scheduler facts reported by `GET /status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub interval_seconds: u64,
}

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub validator: SignalValidator,
    pub dispatcher: Arc<dyn TradeDispatcher>,
    pub scheduler: SchedulerStatus,
}

impl AppState {
    pub fn new(cfg: &Config, dispatcher: Arc<dyn TradeDispatcher>, scheduler_enabled: bool) -> Self {
        Self {
            validator: SignalValidator::new(cfg.webhook_passphrase.clone()),
            dispatcher,
            scheduler: SchedulerStatus {
                enabled: scheduler_enabled,
                interval_seconds: cfg.scheduler_interval_seconds,
            },
        }
    }
}

/// Build the full HTTP surface with the webhook mounted at `webhook_path`.
pub fn router(state: AppState, webhook_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::webhook_router(webhook_path))
        .merge(routes::status_router())
        .merge(routes::dashboard_router())
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn serve<S>(
    state: AppState,
    host: &str,
    port: u16,
    webhook_path: &str,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    check_webhook_path(webhook_path)?;
    let app = router(state, webhook_path);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;

    info!(%addr, webhook = %webhook_path, "Webhook server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Reject webhook paths the router cannot mount as a single literal route.
fn check_webhook_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(Error::Config(format!(
            "webhook endpoint must start with '/', got {path:?}"
        )));
    }
    if path.contains(['*', ':', '{', '}']) {
        return Err(Error::Config(format!(
            "webhook endpoint must not contain route parameters, got {path:?}"
        )));
    }
    Ok(())
}
