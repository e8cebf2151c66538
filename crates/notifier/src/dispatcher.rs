use notice_common::error::AppError;
use notice_common::types::{NOTIFICATION_SOUND, NOTIFICATION_TITLE, Notice, PushData, PushMessage};

use crate::PushTransport;

/// Result of dispatching one notice.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The transport accepted the batch.
    Sent { messages: usize },
    /// No tokens were registered, so nothing was submitted.
    NoRecipients,
    /// The transport call failed. The batch is not retried.
    Failed { error: AppError },
}

impl DispatchOutcome {
    pub fn messages_sent(&self) -> usize {
        match self {
            DispatchOutcome::Sent { messages } => *messages,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }
}

/// Build one message per token, in token order.
pub fn build_messages(notice: &Notice, tokens: &[String]) -> Vec<PushMessage> {
    tokens
        .iter()
        .map(|token| PushMessage {
            to: token.clone(),
            sound: NOTIFICATION_SOUND.to_string(),
            title: NOTIFICATION_TITLE.to_string(),
            body: notice.title.clone(),
            data: PushData {
                url: notice.url.clone(),
            },
        })
        .collect()
}

/// Fans a notice out to every registered token through a `PushTransport`.
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: PushTransport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit one batch for `notice`. Never returns an error: failures are
    /// logged and reported in the outcome.
    pub async fn dispatch(&self, notice: &Notice, tokens: &[String]) -> DispatchOutcome {
        if tokens.is_empty() {
            tracing::info!(title = %notice.title, "No registered tokens, skipping push");
            return DispatchOutcome::NoRecipients;
        }

        let messages = build_messages(notice, tokens);

        match self.transport.send_batch(&messages).await {
            Ok(()) => {
                tracing::info!(
                    title = %notice.title,
                    recipients = messages.len(),
                    "Notifications sent for notice"
                );
                DispatchOutcome::Sent {
                    messages: messages.len(),
                }
            }
            Err(error) => {
                tracing::error!(
                    title = %notice.title,
                    recipients = messages.len(),
                    error = %error,
                    "Failed to send push notification"
                );
                DispatchOutcome::Failed { error }
            }
        }
    }
}
