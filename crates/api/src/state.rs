//! Shared application state for the Axum API server.

use std::sync::Arc;

use notice_common::config::AppConfig;
use notice_engine::registry::TokenRegistry;
use notice_poller::PollerStatus;
use tokio::sync::watch;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TokenRegistry>,
    pub poller_status: watch::Receiver<PollerStatus>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        registry: Arc<TokenRegistry>,
        poller_status: watch::Receiver<PollerStatus>,
        config: AppConfig,
    ) -> Self {
        Self {
            registry,
            poller_status,
            config,
        }
    }
}
