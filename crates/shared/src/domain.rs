use serde::{Deserialize, Serialize};

/// Sort keys understood by the upstream ideas API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::Newest, SortOrder::Oldest];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "-published_at",
            SortOrder::Oldest => "published_at",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
        }
    }
}

/// Page sizes offered by the "show per page" selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.get() == value)
    }
}

/// The triple that fully determines which page of ideas is requested.
///
/// `page` is always at least 1; the transitions below keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListState {
    pub page: u32,
    pub size: PageSize,
    pub sort: SortOrder,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            page: 1,
            size: PageSize::default(),
            sort: SortOrder::default(),
        }
    }
}

impl ListState {
    pub fn with_page(self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    /// Changing the page size always starts over from the first page.
    pub fn with_size(self, size: PageSize) -> Self {
        Self {
            page: 1,
            size,
            ..self
        }
    }

    /// Changing the sort always starts over from the first page.
    pub fn with_sort(self, sort: SortOrder) -> Self {
        Self {
            page: 1,
            sort,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: i64,
    #[serde(rename = "mime")]
    pub mime_type: String,
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub published_at: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "small_image", default)]
    pub small_images: Vec<ImageAsset>,
    #[serde(rename = "medium_image", default)]
    pub medium_images: Vec<ImageAsset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// Body returned by the upstream API (and relayed verbatim by the gateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeasResponse {
    pub data: Vec<Item>,
    pub meta: PageMeta,
}

/// Most recently fetched page plus pagination totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<Item>,
    pub current_page: u32,
    pub last_page: u32,
    pub page_size: u32,
    pub total_items: u64,
}

impl Default for PageResult {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            last_page: 1,
            page_size: PageSize::default().get(),
            total_items: 0,
        }
    }
}

impl PageResult {
    /// Replaces everything wholesale from a response. Upstream sends
    /// `last_page: 0` for empty collections, so both page numbers are clamped.
    pub fn from_response(response: IdeasResponse) -> Self {
        let last_page = response.meta.last_page.max(1);
        Self {
            items: response.data,
            current_page: response.meta.current_page.clamp(1, last_page),
            last_page,
            page_size: response.meta.per_page,
            total_items: response.meta.total,
        }
    }
}
