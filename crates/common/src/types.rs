use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Banner shown as the title of every notice notification.
pub const NOTIFICATION_TITLE: &str = "New Notice Published 😊!";

/// Sound played by the device when a notification arrives.
pub const NOTIFICATION_SOUND: &str = "default";

/// A notice scraped from the source site.
///
/// Identity for deduplication is the `title` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub url: Option<String>,
    /// Publication date exactly as printed on the site (`dd/mm/yyyy`).
    pub date: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, url: Option<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url,
            date: date.into(),
        }
    }
}

/// A notice title that has already triggered a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub title: String,
    pub sent_at: DateTime<Utc>,
}

/// Extra payload attached to a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushData {
    pub url: Option<String>,
}

/// One push message addressed to a single device token, in the shape the
/// Expo push API accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: String,
    pub sound: String,
    pub title: String,
    pub body: String,
    pub data: PushData,
}

/// Outcome of a successful token registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Created,
    AlreadyRegistered,
}

impl std::fmt::Display for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Registration::Created => write!(f, "created"),
            Registration::AlreadyRegistered => write!(f, "already_registered"),
        }
    }
}
