use crate::DEFAULT_MAX_PAGES;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Caller-facing knobs for one traversal of the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOptions {
    pub page_size: u32,
    pub max_pages: u32,
    /// Lower bound of the recommendation date filter, `YYYY-MM-DD`.
    pub recommend_begin: Option<String>,
    /// Upper bound of the recommendation date filter, `YYYY-MM-DD`.
    pub recommend_end: Option<String>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            recommend_begin: None,
            recommend_end: None,
        }
    }
}

impl HarvestOptions {
    /// Page size with zero mapped to the default.
    pub fn effective_page_size(&self) -> u32 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Page cap with zero mapped to the default.
    pub fn effective_max_pages(&self) -> u32 {
        if self.max_pages == 0 {
            DEFAULT_MAX_PAGES
        } else {
            self.max_pages
        }
    }
}
