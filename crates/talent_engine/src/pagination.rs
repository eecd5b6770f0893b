use talent_core::{HarvestOptions, Operation, PageCursor, PageResult, PageStep};
use talent_logging::{harvest_debug, harvest_info};

use crate::api::ListQuery;
use crate::client::PlatformClient;
use crate::endpoints::EndpointSource;
use crate::recovery::with_permission_recovery;
use crate::HarvestError;

/// Page-by-page walk over the candidate list.
///
/// Each call to [`next_page`](Self::next_page) performs at most one list
/// fetch. Failures of the list operation are fatal for the traversal.
#[derive(Debug, Clone)]
pub struct Paginator {
    cursor: PageCursor,
    recommend_begin: Option<String>,
    recommend_end: Option<String>,
}

impl Paginator {
    pub fn new(options: &HarvestOptions) -> Self {
        Self {
            cursor: PageCursor::new(options.effective_page_size(), options.effective_max_pages()),
            recommend_begin: options.recommend_begin.clone(),
            recommend_end: options.recommend_end.clone(),
        }
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Fetches the next page, or returns `None` once the traversal is over.
    /// An empty page ends the traversal and is not returned.
    pub async fn next_page<S>(
        &mut self,
        client: &PlatformClient,
        endpoints: &mut S,
    ) -> Result<Option<PageResult>, HarvestError>
    where
        S: EndpointSource + ?Sized,
    {
        let Some(page_no) = self.cursor.next_page() else {
            return Ok(None);
        };

        let page = self.fetch_page(client, endpoints, page_no).await?;
        let step = self.cursor.record(&page);
        harvest_debug!(
            "Page {} returned {} rows (fetched {}, total {:?})",
            page_no,
            page.records.len(),
            self.cursor.fetched(),
            self.cursor.total()
        );
        if let PageStep::Finished(reason) = step {
            harvest_info!(
                "Candidate traversal finished after page {}: {:?}",
                page_no,
                reason
            );
        }

        if page.is_empty() {
            return Ok(None);
        }
        Ok(Some(page))
    }

    /// Fetches one specific page without touching the cursor.
    pub async fn fetch_page<S>(
        &self,
        client: &PlatformClient,
        endpoints: &mut S,
        page_no: u32,
    ) -> Result<PageResult, HarvestError>
    where
        S: EndpointSource + ?Sized,
    {
        let query = ListQuery {
            page_no,
            page_size: self.cursor.page_size(),
            recommend_begin: self.recommend_begin.clone(),
            recommend_end: self.recommend_end.clone(),
        };
        let query = &query;
        with_permission_recovery(endpoints, Operation::CandidateList, move |url| {
            client.fetch_candidate_page(url, query)
        })
        .await
    }
}
