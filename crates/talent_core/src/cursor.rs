use crate::PageResult;

/// Hard upper bound on pages fetched by one traversal.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Why a traversal stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back without rows.
    EmptyPage,
    /// The running row count reached the reported total.
    TotalReached,
    /// The page cap was hit.
    PageCap,
}

/// Outcome of recording one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Continue,
    Finished(StopReason),
}

/// Pure pagination state: which page to request next and when to stop.
///
/// Pages start at 1 and advance by one. The total is taken from the first page
/// that reports a positive count and is never re-read afterwards. Zero rows
/// always ends the traversal regardless of the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    page_size: u32,
    max_pages: u32,
    next_page: u32,
    total: Option<u64>,
    fetched: u64,
    stopped: Option<StopReason>,
}

impl PageCursor {
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            page_size,
            max_pages,
            next_page: 1,
            total: None,
            fetched: 0,
            stopped: if max_pages == 0 {
                Some(StopReason::PageCap)
            } else {
                None
            },
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Page number to fetch next, or `None` once the traversal is over.
    pub fn next_page(&self) -> Option<u32> {
        match self.stopped {
            Some(_) => None,
            None => Some(self.next_page),
        }
    }

    /// Records a fetched page and decides whether to keep going.
    pub fn record(&mut self, page: &PageResult) -> PageStep {
        if let Some(reason) = self.stopped {
            return PageStep::Finished(reason);
        }

        if self.total.is_none() {
            self.total = page.total.filter(|n| *n > 0);
        }

        if page.is_empty() {
            return self.finish(StopReason::EmptyPage);
        }

        self.fetched += page.records.len() as u64;
        if matches!(self.total, Some(total) if self.fetched >= total) {
            return self.finish(StopReason::TotalReached);
        }

        if self.next_page >= self.max_pages {
            return self.finish(StopReason::PageCap);
        }
        self.next_page += 1;
        PageStep::Continue
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn fetched(&self) -> u64 {
        self.fetched
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    fn finish(&mut self, reason: StopReason) -> PageStep {
        self.stopped = Some(reason);
        PageStep::Finished(reason)
    }
}
