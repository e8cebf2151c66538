use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use notice_common::error::AppError;
use notice_engine::processor::{CycleReport, NoticeProcessor};
use notice_notifier::PushTransport;
use notice_source::NoticeSource;

/// Whether the scheduler is waiting for its next tick or running a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Idle,
    Polling,
}

impl std::fmt::Display for PollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollState::Idle => write!(f, "idle"),
            PollState::Polling => write!(f, "polling"),
        }
    }
}

/// Snapshot of the scheduler published after every state change.
#[derive(Debug, Clone, Serialize)]
pub struct PollerStatus {
    pub state: PollState,
    pub completed_cycles: u64,
    /// Cycles that panicked and were abandoned.
    pub failed_cycles: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
}

impl Default for PollerStatus {
    fn default() -> Self {
        Self {
            state: PollState::Idle,
            completed_cycles: 0,
            failed_cycles: 0,
            last_cycle_at: None,
            last_report: None,
        }
    }
}

/// Drives the poll cycle on a fixed interval.
///
/// Cycles run one at a time inside `run`. A tick that comes due while a
/// cycle is still in flight is skipped rather than queued. A cycle that
/// panics is logged and abandoned; the loop keeps ticking.
pub struct PollScheduler<S, T> {
    processor: NoticeProcessor<S, T>,
    interval: Duration,
    status: watch::Sender<PollerStatus>,
}

impl<S, T> PollScheduler<S, T>
where
    S: NoticeSource,
    T: PushTransport,
{
    pub fn new(processor: NoticeProcessor<S, T>, interval: Duration) -> Result<Self, AppError> {
        if interval.is_zero() {
            return Err(AppError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let (status, _) = watch::channel(PollerStatus::default());
        Ok(Self {
            processor,
            interval,
            status,
        })
    }

    /// Subscribe to status updates.
    pub fn status(&self) -> watch::Receiver<PollerStatus> {
        self.status.subscribe()
    }

    pub fn processor(&self) -> &NoticeProcessor<S, T> {
        &self.processor
    }

    /// Start the polling loop. Runs until the task is dropped.
    ///
    /// The first cycle runs one full interval after start.
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Notice poller started"
        );

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// Run a single cycle now, publishing POLLING then IDLE.
    ///
    /// Returns `None` if the cycle panicked.
    pub async fn run_once(&mut self) -> Option<CycleReport> {
        self.status.send_modify(|s| s.state = PollState::Polling);

        let outcome = AssertUnwindSafe(self.processor.run_cycle())
            .catch_unwind()
            .await;

        let finished_at = Utc::now();
        match outcome {
            Ok(report) => {
                self.status.send_modify(|s| {
                    s.state = PollState::Idle;
                    s.completed_cycles += 1;
                    s.last_cycle_at = Some(finished_at);
                    s.last_report = Some(report.clone());
                });
                Some(report)
            }
            Err(panic) => {
                tracing::error!(
                    reason = %panic_message(panic.as_ref()),
                    "Poll cycle panicked, waiting for next tick"
                );
                self.status.send_modify(|s| {
                    s.state = PollState::Idle;
                    s.failed_cycles += 1;
                    s.last_cycle_at = Some(finished_at);
                });
                None
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
