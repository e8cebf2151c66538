//! NoticeRelay server binary: token registration API plus the notice poller.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use notice_common::config::AppConfig;
use notice_engine::processor::{NoticeProcessor, offset_from_minutes};
use notice_engine::registry::TokenRegistry;
use notice_engine::token_store::TokenStore;
use notice_notifier::{Dispatcher, ExpoPushClient};
use notice_poller::PollScheduler;
use notice_source::{HttpNoticeSource, NoticeSelectors};

use notice_api::routes::create_router;
use notice_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "notice_api=info,notice_poller=info,notice_engine=info,notice_source=info,notice_notifier=info,tower_http=info",
            )
        }))
        .init();

    tracing::info!("Starting NoticeRelay...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let timeout = Duration::from_secs(config.http_timeout_seconds);

    // Seed the registry from the durable token file
    let store = TokenStore::new(&config.token_store_path);
    let registry = Arc::new(TokenRegistry::from_store(store).await?);

    // Wire the poll cycle
    let selectors = NoticeSelectors::with_overrides(
        config.notice_item_selector.as_deref(),
        config.notice_link_selector.as_deref(),
        config.notice_date_selector.as_deref(),
    )?;
    let source =
        HttpNoticeSource::new(config.notice_source_url.clone(), timeout)?.with_selectors(selectors);
    let transport = ExpoPushClient::new(config.push_endpoint.clone(), timeout)?;

    tracing::info!(
        source = %source.url(),
        push_endpoint = %transport.endpoint(),
        "Notice poller configured"
    );

    let processor = NoticeProcessor::new(source, Dispatcher::new(transport), registry.clone())
        .with_utc_offset(offset_from_minutes(config.notice_utc_offset_minutes))
        .with_date_override(config.notice_date_override.clone());

    let mut scheduler =
        PollScheduler::new(processor, Duration::from_secs(config.poll_interval_seconds))?;
    let poller_status = scheduler.status();
    let poller = tokio::spawn(async move { scheduler.run().await });

    // Build router
    let state = AppState::new(registry, poller_status, config.clone());
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    poller.abort();
    tracing::info!("NoticeRelay stopped.");
    Ok(())
}
