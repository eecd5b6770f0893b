use serde_json::Value;
use talent_core::{CandidateRecord, HarvestedItem, Operation};
use talent_logging::{harvest_debug, harvest_warn};

use crate::client::PlatformClient;
use crate::endpoints::EndpointSource;
use crate::recovery::with_permission_recovery;

/// Pairs each candidate with its resume and job description.
///
/// The two fetches are independent: a failure on one leaves that field
/// absent and never affects the other or the rest of the page.
#[derive(Debug, Clone, Copy)]
pub struct CandidateCorrelator<'a> {
    client: &'a PlatformClient,
}

impl<'a> CandidateCorrelator<'a> {
    pub fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// Resume first, then job description.
    pub async fn correlate<S>(&self, endpoints: &mut S, record: CandidateRecord) -> HarvestedItem
    where
        S: EndpointSource + ?Sized,
    {
        let resume = self.fetch_resume(endpoints, &record).await;
        let description = fetch_job_description(self.client, endpoints, &record).await;
        HarvestedItem::new(record, description, resume)
    }

    /// Resume bytes, or `None` when the record lacks ids or the fetch failed.
    pub async fn fetch_resume<S>(
        &self,
        endpoints: &mut S,
        record: &CandidateRecord,
    ) -> Option<Vec<u8>>
    where
        S: EndpointSource + ?Sized,
    {
        let Some((apply_id, resume_id)) = record.resume_ref() else {
            harvest_debug!("Skipping resume for record without application/resume id");
            return None;
        };
        let client = self.client;
        let result = with_permission_recovery(endpoints, Operation::ResumeDocument, move |url| {
            client.fetch_resume(url, apply_id, resume_id)
        })
        .await;
        match result {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                harvest_warn!("Resume for application {} unavailable: {}", apply_id, err);
                None
            }
        }
    }
}

/// Job description for the record's job id, or `None` when the record has
/// no job id or the fetch failed.
pub(crate) async fn fetch_job_description<S>(
    client: &PlatformClient,
    endpoints: &mut S,
    record: &CandidateRecord,
) -> Option<Value>
where
    S: EndpointSource + ?Sized,
{
    let Some(job_id) = record.job_id.as_deref() else {
        harvest_debug!("Skipping job description for record without job id");
        return None;
    };
    let recruit_type = record.recruit_type.as_deref();
    let result = with_permission_recovery(endpoints, Operation::JobDescription, move |url| {
        client.fetch_job_description(url, job_id, recruit_type)
    })
    .await;
    match result {
        Ok(description) => Some(description),
        Err(err) => {
            harvest_warn!("Job description for {} unavailable: {}", job_id, err);
            None
        }
    }
}
