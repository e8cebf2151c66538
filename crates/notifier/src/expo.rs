use std::time::Duration;

use async_trait::async_trait;
use notice_common::error::AppError;
use notice_common::types::PushMessage;

use crate::PushTransport;

/// HTTP client for the Expo push API.
///
/// The whole batch is POSTed as a JSON array. Per-token tickets in the
/// response are logged but not tracked.
pub struct ExpoPushClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ExpoPushClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build push client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushTransport for ExpoPushClient {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(messages)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("push request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Transport(format!("push endpoint returned an error: {e}")))?;

        // Tickets are informational only; an unreadable body is not a failure.
        match response.json::<serde_json::Value>().await {
            Ok(body) => tracing::debug!(
                messages = messages.len(),
                response = %body,
                "Push batch accepted"
            ),
            Err(e) => tracing::debug!(
                messages = messages.len(),
                error = %e,
                "Push batch accepted with unreadable response body"
            ),
        }

        Ok(())
    }
}
