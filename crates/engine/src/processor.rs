//! Poll cycle.
//!
//! One cycle:
//! 1. Fetches the current notices from the `NoticeSource`
//! 2. Computes today's date in the site's fixed UTC offset
//! 3. Dispatches every notice dated today whose title is not in the ledger,
//!    then records it in the ledger whatever the dispatch outcome
//! 4. Prunes ledger entries older than the retention window
//!
//! A cycle never fails: fetch and delivery problems are logged and the next
//! cycle tries again.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use notice_common::config::DEFAULT_UTC_OFFSET_MINUTES;
use notice_notifier::{DispatchOutcome, Dispatcher, PushTransport};
use notice_source::NoticeSource;

use crate::ledger::DedupLedger;
use crate::registry::TokenRegistry;

/// Date format the source site prints notice dates in.
pub const NOTICE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Summary of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Notices returned by the source.
    pub fetched: usize,
    /// Notices dated today that were not yet in the ledger.
    pub matched: usize,
    /// Notices for which a batch was accepted by the transport.
    pub dispatched: usize,
    /// Individual push messages accepted by the transport.
    pub messages_sent: usize,
    /// Notices whose batch failed.
    pub failed: usize,
    /// Ledger records removed by pruning.
    pub pruned: usize,
}

/// Format `now` as a notice date in the given fixed offset.
pub fn today_string(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format(NOTICE_DATE_FORMAT).to_string()
}

/// Build a fixed offset from minutes east of UTC, falling back to the
/// site default when out of range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            tracing::warn!(minutes, "Invalid UTC offset, using default");
            default_offset()
        })
}

fn default_offset() -> FixedOffset {
    // 330 minutes is well inside chrono's ±24h range.
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).expect("valid default offset")
}

/// Runs the fetch → filter → dispatch → prune cycle and owns the ledger.
pub struct NoticeProcessor<S, T> {
    source: S,
    dispatcher: Dispatcher<T>,
    registry: Arc<TokenRegistry>,
    ledger: DedupLedger,
    utc_offset: FixedOffset,
    date_override: Option<String>,
}

impl<S, T> NoticeProcessor<S, T>
where
    S: NoticeSource,
    T: PushTransport,
{
    pub fn new(source: S, dispatcher: Dispatcher<T>, registry: Arc<TokenRegistry>) -> Self {
        Self {
            source,
            dispatcher,
            registry,
            ledger: DedupLedger::new(),
            utc_offset: default_offset(),
            date_override: None,
        }
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Compare notices against a fixed date string instead of the clock.
    pub fn with_date_override(mut self, date: Option<String>) -> Self {
        if let Some(date) = &date {
            tracing::warn!(date = %date, "Notice date override active");
        }
        self.date_override = date;
        self
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    /// The date string notices must carry to be dispatched at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> String {
        match &self.date_override {
            Some(date) => date.clone(),
            None => today_string(now, self.utc_offset),
        }
    }

    /// Run one cycle at the current time.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle as if the clock read `now`.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let span = tracing::info_span!("poll_cycle", cycle_id = %Uuid::new_v4());
        self.cycle(now).instrument(span).await
    }

    async fn cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport::default();

        let notices = self.source.fetch_notices().await;
        report.fetched = notices.len();

        let today = self.today(now);

        for notice in &notices {
            tracing::debug!(title = %notice.title, date = %notice.date, "Checking notice");

            if notice.date != today || self.ledger.has_sent(&notice.title) {
                continue;
            }
            report.matched += 1;

            let tokens = self.registry.list().await;
            match self.dispatcher.dispatch(notice, &tokens).await {
                DispatchOutcome::Sent { messages } => {
                    report.dispatched += 1;
                    report.messages_sent += messages;
                }
                DispatchOutcome::NoRecipients => {}
                DispatchOutcome::Failed { .. } => report.failed += 1,
            }

            // Recorded even when delivery failed: a failed batch is not retried.
            self.ledger.record_sent(notice.title.clone(), now);
        }

        report.pruned = self.ledger.prune(now);

        tracing::info!(
            source = %self.source.name(),
            today = %today,
            fetched = report.fetched,
            matched = report.matched,
            dispatched = report.dispatched,
            messages_sent = report.messages_sent,
            failed = report.failed,
            pruned = report.pruned,
            ledger_size = self.ledger.len(),
            "Poll cycle complete"
        );

        report
    }
}
