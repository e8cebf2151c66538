//! End-to-end poll cycle tests with an in-process source and push transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use notice_common::error::AppError;
use notice_common::types::{Notice, PushMessage};
use notice_engine::processor::NoticeProcessor;
use notice_engine::registry::TokenRegistry;
use notice_notifier::{Dispatcher, PushTransport};
use notice_source::{NoticeSource, StaticNoticeSource};

// ============================================================
// Shared helpers
// ============================================================

/// Transport that records every batch and optionally fails.
#[derive(Clone, Default)]
struct RecordingTransport {
    batches: Arc<Mutex<Vec<Vec<PushMessage>>>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn messages(&self) -> Vec<PushMessage> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), AppError> {
        self.batches.lock().unwrap().push(messages.to_vec());
        if self.fail {
            Err(AppError::Transport("push endpoint unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Source whose notices can be swapped between cycles.
#[derive(Clone, Default)]
struct SwappableSource {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl SwappableSource {
    fn set(&self, notices: Vec<Notice>) {
        *self.notices.lock().unwrap() = notices;
    }
}

#[async_trait]
impl NoticeSource for SwappableSource {
    async fn fetch_notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    fn name(&self) -> &str {
        "swappable"
    }
}

fn exam_notice() -> Notice {
    Notice::new("Exam Notice", Some("/e1".to_string()), "03/03/2025")
}

/// 10:00 IST on 3 March 2025.
fn march_third() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 4, 30, 0).unwrap()
}

async fn registry_with(tokens: &[&str]) -> Arc<TokenRegistry> {
    let registry = TokenRegistry::in_memory();
    for token in tokens {
        registry.register(token).await.unwrap();
    }
    Arc::new(registry)
}

// ============================================================
// Scenarios
// ============================================================

#[tokio::test]
async fn test_matching_notice_is_pushed_to_every_token_once() {
    let transport = RecordingTransport::default();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(vec![exam_notice()]),
        Dispatcher::new(transport.clone()),
        registry_with(&["A", "B"]).await,
    );

    let report = processor.run_cycle_at(march_third()).await;

    assert_eq!(report.fetched, 1);
    assert_eq!(report.matched, 1);
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.messages_sent, 2);

    let messages = transport.messages();
    assert_eq!(transport.batch_count(), 1);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].to, "A");
    assert_eq!(messages[1].to, "B");
    assert!(messages.iter().all(|m| m.body == "Exam Notice"));

    assert_eq!(processor.ledger().len(), 1);
    assert!(processor.ledger().has_sent("Exam Notice"));

    // Same source output again: nothing new goes out.
    let second = processor.run_cycle_at(march_third() + Duration::minutes(1)).await;
    assert_eq!(second.matched, 0);
    assert_eq!(transport.messages().len(), 2);
    assert_eq!(processor.ledger().len(), 1);
}

#[tokio::test]
async fn test_date_mismatch_sends_nothing() {
    let transport = RecordingTransport::default();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(vec![exam_notice()]),
        Dispatcher::new(transport.clone()),
        registry_with(&["A", "B"]).await,
    );

    let report = processor
        .run_cycle_at(march_third() + Duration::days(1))
        .await;

    assert_eq!(report.fetched, 1);
    assert_eq!(report.matched, 0);
    assert_eq!(transport.batch_count(), 0);
    assert!(processor.ledger().is_empty());
}

#[tokio::test]
async fn test_date_override_replaces_clock() {
    let transport = RecordingTransport::default();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(vec![exam_notice()]),
        Dispatcher::new(transport.clone()),
        registry_with(&["A"]).await,
    )
    .with_date_override(Some("03/03/2025".to_string()));

    let report = processor
        .run_cycle_at(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap())
        .await;

    assert_eq!(report.messages_sent, 1);
}

#[tokio::test]
async fn test_notices_processed_in_source_order_with_title_identity() {
    let transport = RecordingTransport::default();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(vec![
            Notice::new("Holiday", None, "03/03/2025"),
            exam_notice(),
            // Same title, different url: treated as the notice above.
            Notice::new("Exam Notice", Some("/e2".to_string()), "03/03/2025"),
            Notice::new("Old Circular", None, "01/03/2025"),
        ]),
        Dispatcher::new(transport.clone()),
        registry_with(&["A"]).await,
    );

    let report = processor.run_cycle_at(march_third()).await;

    assert_eq!(report.fetched, 4);
    assert_eq!(report.matched, 2);
    let bodies: Vec<String> = transport.messages().into_iter().map(|m| m.body).collect();
    assert_eq!(bodies, vec!["Holiday", "Exam Notice"]);
    assert_eq!(transport.messages()[1].data.url.as_deref(), Some("/e1"));
}

#[tokio::test]
async fn test_failed_delivery_is_still_recorded() {
    let transport = RecordingTransport::failing();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(vec![exam_notice()]),
        Dispatcher::new(transport.clone()),
        registry_with(&["A", "B"]).await,
    );

    let first = processor.run_cycle_at(march_third()).await;
    assert_eq!(first.failed, 1);
    assert_eq!(first.dispatched, 0);
    assert!(processor.ledger().has_sent("Exam Notice"));

    let second = processor.run_cycle_at(march_third() + Duration::minutes(1)).await;
    assert_eq!(second.matched, 0);
    assert_eq!(transport.batch_count(), 1);
}

#[tokio::test]
async fn test_no_tokens_records_without_calling_transport() {
    let transport = RecordingTransport::default();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(vec![exam_notice()]),
        Dispatcher::new(transport.clone()),
        registry_with(&[]).await,
    );

    let report = processor.run_cycle_at(march_third()).await;

    assert_eq!(report.matched, 1);
    assert_eq!(report.dispatched, 0);
    assert_eq!(transport.batch_count(), 0);
    assert!(processor.ledger().has_sent("Exam Notice"));
}

#[tokio::test]
async fn test_tokens_registered_between_cycles_receive_new_notices() {
    let transport = RecordingTransport::default();
    let source = SwappableSource::default();
    let registry = registry_with(&["A"]).await;
    let mut processor = NoticeProcessor::new(
        source.clone(),
        Dispatcher::new(transport.clone()),
        registry.clone(),
    );

    source.set(vec![exam_notice()]);
    processor.run_cycle_at(march_third()).await;

    registry.register("B").await.unwrap();
    source.set(vec![
        exam_notice(),
        Notice::new("Admit Card", Some("/a1".to_string()), "03/03/2025"),
    ]);
    let report = processor.run_cycle_at(march_third() + Duration::minutes(1)).await;

    assert_eq!(report.matched, 1);
    assert_eq!(report.messages_sent, 2);
    let recipients: Vec<String> = transport.messages()[1..]
        .iter()
        .map(|m| m.to.clone())
        .collect();
    assert_eq!(recipients, vec!["A", "B"]);
}

#[tokio::test]
async fn test_ledger_is_pruned_every_cycle() {
    let transport = RecordingTransport::default();
    let source = SwappableSource::default();
    let mut processor = NoticeProcessor::new(
        source.clone(),
        Dispatcher::new(transport.clone()),
        registry_with(&["A"]).await,
    );

    source.set(vec![exam_notice()]);
    processor.run_cycle_at(march_third()).await;
    assert_eq!(processor.ledger().len(), 1);

    // Source goes quiet; 25 hours later the record is gone.
    source.set(Vec::new());
    let report = processor
        .run_cycle_at(march_third() + Duration::hours(25))
        .await;

    assert_eq!(report.fetched, 0);
    assert_eq!(report.pruned, 1);
    assert!(processor.ledger().is_empty());
}

#[tokio::test]
async fn test_empty_source_is_a_quiet_cycle() {
    let transport = RecordingTransport::default();
    let mut processor = NoticeProcessor::new(
        StaticNoticeSource::new(Vec::new()),
        Dispatcher::new(transport.clone()),
        registry_with(&["A"]).await,
    );

    let report = processor.run_cycle_at(march_third()).await;
    assert_eq!(report, Default::default());
    assert_eq!(transport.batch_count(), 0);
}
