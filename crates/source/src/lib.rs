pub mod http;
pub mod parser;

use async_trait::async_trait;
use notice_common::types::Notice;

pub use http::HttpNoticeSource;
pub use parser::{NoticeSelectors, parse_notices};

/// Anything that can produce the current list of notices.
///
/// Implementations are fail-soft: a transport or parse problem yields an
/// empty list and is retried on the next cycle.
#[async_trait]
pub trait NoticeSource: Send + Sync {
    async fn fetch_notices(&self) -> Vec<Notice>;

    /// Human-readable name used in logs.
    fn name(&self) -> &str;
}

/// Source that always returns the same notices. Handy for tests and dry runs.
pub struct StaticNoticeSource {
    notices: Vec<Notice>,
}

impl StaticNoticeSource {
    pub fn new(notices: Vec<Notice>) -> Self {
        Self { notices }
    }
}

#[async_trait]
impl NoticeSource for StaticNoticeSource {
    async fn fetch_notices(&self) -> Vec<Notice> {
        self.notices.clone()
    }

    fn name(&self) -> &str {
        "static"
    }
}
