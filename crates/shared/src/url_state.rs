//! Canonical encode/decode pair between [`ListState`] and the page address.
//!
//! The address is a lossy channel: anything that does not parse is replaced by
//! the default for that field instead of being reported.

use url::form_urlencoded;

use crate::domain::{ListState, PageSize, SortOrder};

pub const PAGE_KEY: &str = "page";
pub const SIZE_KEY: &str = "size";
pub const SORT_KEY: &str = "sort";

/// Reads `page`, `size` and `sort` from a query string (leading `?` optional).
pub fn decode(query: &str) -> ListState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut page = None;
    let mut size = None;
    let mut sort = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PAGE_KEY if page.is_none() => page = Some(value.into_owned()),
            SIZE_KEY if size.is_none() => size = Some(value.into_owned()),
            SORT_KEY if sort.is_none() => sort = Some(value.into_owned()),
            _ => {}
        }
    }

    let defaults = ListState::default();
    ListState {
        page: page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(defaults.page),
        size: size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .and_then(PageSize::from_u32)
            .unwrap_or(defaults.size),
        sort: sort
            .as_deref()
            .and_then(SortOrder::parse)
            .unwrap_or(defaults.sort),
    }
}

/// Writes the state as `page=<n>&size=<size>&sort=<sort>`.
pub fn encode(state: &ListState) -> String {
    format!(
        "{PAGE_KEY}={}&{SIZE_KEY}={}&{SORT_KEY}={}",
        state.page,
        state.size.get(),
        state.sort.as_str()
    )
}

#[cfg(test)]
#[path = "tests/url_state_tests.rs"]
mod tests;
