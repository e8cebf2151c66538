//! Push notification delivery.
//!
//! `Dispatcher` turns one notice into one message per registered device token
//! and hands the whole batch to a `PushTransport`. The production transport is
//! the Expo push API (`ExpoPushClient`).

pub mod dispatcher;
pub mod expo;

use async_trait::async_trait;
use notice_common::error::AppError;
use notice_common::types::PushMessage;

pub use dispatcher::{DispatchOutcome, Dispatcher, build_messages};
pub use expo::ExpoPushClient;

/// Delivers a batch of push messages in a single call.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), AppError>;
}
