use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn status_router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

/// Liveness and scheduler configuration. No auth required.
async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "active",
        "version": env!("CARGO_PKG_VERSION"),
        "scheduler_enabled": state.scheduler.enabled,
        "scheduler_interval": state.scheduler.interval_seconds,
    }))
}
