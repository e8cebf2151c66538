use std::time::Duration;

use async_trait::async_trait;
use notice_common::error::AppError;
use notice_common::types::Notice;

use crate::NoticeSource;
use crate::parser::{NoticeSelectors, parse_notices};

/// Build an HTTP client whose requests are bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("notice-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))
}

/// Scrapes notices from a single web page.
pub struct HttpNoticeSource {
    client: reqwest::Client,
    url: String,
    selectors: NoticeSelectors,
}

impl HttpNoticeSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
            selectors: NoticeSelectors::default(),
        })
    }

    /// Replace the default sidebar selectors.
    pub fn with_selectors(mut self, selectors: NoticeSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw page body.
    pub async fn fetch_raw(&self) -> Result<String, AppError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("request to {} failed: {e}", self.url)))?
            .error_for_status()
            .map_err(|e| AppError::Transport(format!("{} returned an error: {e}", self.url)))?;

        response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("reading body from {} failed: {e}", self.url)))
    }
}

#[async_trait]
impl NoticeSource for HttpNoticeSource {
    async fn fetch_notices(&self) -> Vec<Notice> {
        let html = match self.fetch_raw().await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Failed to fetch latest notices");
                return Vec::new();
            }
        };

        let notices = parse_notices(&html, &self.selectors);
        tracing::debug!(
            url = %self.url,
            bytes = html.len(),
            notices = notices.len(),
            "Parsed notice page"
        );
        notices
    }

    fn name(&self) -> &str {
        &self.url
    }
}
