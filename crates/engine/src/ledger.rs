//! Dedup ledger — remembers which notice titles have already been pushed.
//!
//! A title stays in the ledger for the retention window (24h by default) and
//! suppresses any further notification for a notice with the same title.
//!
//! State is held in-memory only. A restart clears it, so a notice dated today
//! may be pushed again after a restart.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use notice_common::types::DeliveryRecord;

/// Default retention window in hours.
const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Ordered, in-memory record of sent notices.
#[derive(Debug, Clone)]
pub struct DedupLedger {
    records: VecDeque<DeliveryRecord>,
    retention: Duration,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::with_retention(Duration::hours(DEFAULT_RETENTION_HOURS))
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            records: VecDeque::new(),
            retention,
        }
    }

    /// Whether a notification for `title` was recorded and not yet pruned.
    pub fn has_sent(&self, title: &str) -> bool {
        self.records.iter().any(|r| r.title == title)
    }

    /// Record that a notification for `title` was attempted at `now`.
    pub fn record_sent(&mut self, title: impl Into<String>, now: DateTime<Utc>) {
        self.records.push_back(DeliveryRecord {
            title: title.into(),
            sent_at: now,
        });
    }

    /// Drop every record older than the retention window. Returns how many
    /// records were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let before = self.records.len();
        self.records.retain(|r| r.sent_at >= cutoff);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &DeliveryRecord> {
        self.records.iter()
    }
}

impl Default for DedupLedger {
    fn default() -> Self {
        Self::new()
    }
}
