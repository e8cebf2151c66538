//! HTML → `Notice` extraction.
//!
//! The university home page lists its latest notices in a sidebar:
//!
//! ```html
//! <div class="latestnotifications">
//!   <div class="sidebar_post">
//!     <ul>
//!       <li>
//!         <div class="title"><a href="/notice/1.pdf">Exam Notice</a></div>
//!         <div class="date">03/03/2025</div>
//!       </li>
//!     </ul>
//!   </div>
//! </div>
//! ```

use notice_common::error::AppError;
use notice_common::types::Notice;
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_ITEM_SELECTOR: &str = ".latestnotifications .sidebar_post ul li";
pub const DEFAULT_LINK_SELECTOR: &str = ".title a";
pub const DEFAULT_DATE_SELECTOR: &str = ".date";

/// Compiled CSS selectors describing where notices live in the document.
#[derive(Debug, Clone)]
pub struct NoticeSelectors {
    item: Selector,
    link: Selector,
    date: Selector,
}

impl NoticeSelectors {
    /// Compile custom selectors. `link` and `date` are matched inside each item.
    pub fn new(item: &str, link: &str, date: &str) -> Result<Self, AppError> {
        Ok(Self {
            item: compile(item)?,
            link: compile(link)?,
            date: compile(date)?,
        })
    }

    /// Compile selectors, falling back to the default for any `None`.
    pub fn with_overrides(
        item: Option<&str>,
        link: Option<&str>,
        date: Option<&str>,
    ) -> Result<Self, AppError> {
        Self::new(
            item.unwrap_or(DEFAULT_ITEM_SELECTOR),
            link.unwrap_or(DEFAULT_LINK_SELECTOR),
            date.unwrap_or(DEFAULT_DATE_SELECTOR),
        )
    }
}

impl Default for NoticeSelectors {
    fn default() -> Self {
        // The default selectors are literals known to be valid.
        Self {
            item: Selector::parse(DEFAULT_ITEM_SELECTOR).expect("valid item selector"),
            link: Selector::parse(DEFAULT_LINK_SELECTOR).expect("valid link selector"),
            date: Selector::parse(DEFAULT_DATE_SELECTOR).expect("valid date selector"),
        }
    }
}

fn compile(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Config(format!("invalid selector '{css}': {e:?}")))
}

/// Parse a document into notices, in document order.
///
/// Items without a title are skipped. A document with no matching items
/// yields an empty list.
pub fn parse_notices(html: &str, selectors: &NoticeSelectors) -> Vec<Notice> {
    let document = Html::parse_document(html);
    let mut notices = Vec::new();

    for item in document.select(&selectors.item) {
        let link = item.select(&selectors.link).next();

        let title = link.map(element_text).unwrap_or_default();
        if title.is_empty() {
            tracing::debug!("Skipping notice entry without a title");
            continue;
        }

        let url = link
            .and_then(|el| el.value().attr("href"))
            .map(|href| href.trim().to_string());

        let date = item
            .select(&selectors.date)
            .next()
            .map(element_text)
            .unwrap_or_default();

        notices.push(Notice { title, url, date });
    }

    notices
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
