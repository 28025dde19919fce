//! Bookkeeping the presentation layer renders: the "Showing" line, the
//! pagination bar and card fields.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::domain::Item;

pub const PLACEHOLDER_THUMBNAIL: &str = "/placeholder.svg?height=200&width=300";

/// Page buttons shown on each side of the current page.
const PAGE_LINK_RADIUS: u32 = 1;

/// Item range derived from page, size and total; never from the item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSummary {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

impl RangeSummary {
    pub fn compute(page: u32, size: u32, total: u64) -> Self {
        let page = u64::from(page.max(1));
        let size = u64::from(size);
        let first = (page - 1) * size + 1;
        if total == 0 || first > total {
            return Self {
                first: 0,
                last: 0,
                total,
            };
        }
        Self {
            first,
            last: (page * size).min(total),
            total,
        }
    }
}

impl fmt::Display for RangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} - {} of {}", self.first, self.last, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u32, current: bool },
    Gap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub previous: Option<u32>,
    pub next: Option<u32>,
    pub links: Vec<PageLink>,
}

impl PageLinks {
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// First page, last page and a window around the current one; a single
/// skipped page is shown rather than replaced by a gap.
pub fn page_links(current: u32, last: u32) -> PageLinks {
    let last = last.max(1);
    let current = current.clamp(1, last);

    let mut anchors = vec![1, last];
    let low = current.saturating_sub(PAGE_LINK_RADIUS).max(1);
    let high = current.saturating_add(PAGE_LINK_RADIUS).min(last);
    anchors.extend(low..=high);
    anchors.sort_unstable();
    anchors.dedup();

    let mut links = Vec::with_capacity(anchors.len() + 2);
    let mut previous_anchor: Option<u32> = None;
    for number in anchors {
        if let Some(prev) = previous_anchor {
            match number - prev {
                1 => {}
                2 => links.push(PageLink::Page {
                    number: prev + 1,
                    current: false,
                }),
                _ => links.push(PageLink::Gap),
            }
        }
        links.push(PageLink::Page {
            number,
            current: number == current,
        });
        previous_anchor = Some(number);
    }

    PageLinks {
        previous: (current > 1).then(|| current - 1),
        next: (current < last).then(|| current + 1),
        links,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCard {
    pub id: i64,
    pub title: String,
    pub thumbnail_url: String,
    pub published_label: String,
}

impl ItemCard {
    pub fn from_item(item: &Item) -> Self {
        let thumbnail_url = item
            .small_images
            .first()
            .map(|image| image.url.as_str())
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_THUMBNAIL)
            .to_string();
        Self {
            id: item.id,
            title: item.title.clone(),
            thumbnail_url,
            published_label: format_published(&item.published_at),
        }
    }
}

/// "September 5, 2022"; unparseable timestamps are shown as sent.
pub fn format_published(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match date {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
