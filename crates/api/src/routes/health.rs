//! Liveness and health endpoints.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
}

async fn liveness() -> &'static str {
    "Push Notifications is working !"
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let poller = state.poller_status.borrow().clone();
    let registered_tokens = state.registry.len().await;

    Json(json!({
        "status": "ok",
        "service": "notice-relay-api",
        "version": env!("CARGO_PKG_VERSION"),
        "poller": {
            "state": poller.state,
            "completed_cycles": poller.completed_cycles,
            "failed_cycles": poller.failed_cycles,
            "interval_seconds": state.config.poll_interval_seconds,
            "last_cycle_at": poller.last_cycle_at,
            "last_report": poller.last_report,
        },
        "registered_tokens": registered_tokens,
    }))
}
