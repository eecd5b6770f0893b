use talent_core::{CandidateRecord, PositionAggregate, PositionBook};
use talent_logging::harvest_debug;

use crate::client::PlatformClient;
use crate::correlate::fetch_job_description;
use crate::endpoints::EndpointSource;

/// Builds the deduplicated job list from a candidate stream.
///
/// Job id membership is checked before any fetch, so each distinct job is
/// described at most once however many candidates reference it.
#[derive(Debug)]
pub struct PositionAggregator<'a> {
    client: &'a PlatformClient,
    book: PositionBook,
    description_fetches: usize,
}

impl<'a> PositionAggregator<'a> {
    pub fn new(client: &'a PlatformClient) -> Self {
        Self {
            client,
            book: PositionBook::new(),
            description_fetches: 0,
        }
    }

    /// Records the candidate's job if it is new. Returns whether it was added.
    pub async fn absorb<S>(&mut self, endpoints: &mut S, record: &CandidateRecord) -> bool
    where
        S: EndpointSource + ?Sized,
    {
        let Some(job_id) = record.job_id.as_deref() else {
            return false;
        };
        if self.book.contains(job_id) {
            harvest_debug!("Job {} already aggregated", job_id);
            return false;
        }

        self.description_fetches += 1;
        let description = fetch_job_description(self.client, endpoints, record).await;
        self.book.insert(PositionAggregate::from_description(
            job_id,
            record,
            description.as_ref(),
        ))
    }

    /// Job description requests issued so far.
    pub fn description_fetches(&self) -> usize {
        self.description_fetches
    }

    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    /// Positions in first-seen order.
    pub fn finish(self) -> Vec<PositionAggregate> {
        self.book.into_positions()
    }
}
