//! Run-level orchestration: one authenticated session, its endpoint cache and
//! the harvest modes built on top of them.

use std::path::Path;

use talent_core::{
    HarvestOptions, HarvestedItem, LoginReport, LoginUser, Operation, PositionAggregate,
};
use talent_logging::{harvest_info, harvest_warn};

use crate::auth::{CredentialSources, Identity, Session, SessionAuthenticator};
use crate::client::PlatformClient;
use crate::correlate::CandidateCorrelator;
use crate::endpoints::{EndpointSource, EndpointTokenResolver};
use crate::filename::resume_filename;
use crate::pagination::Paginator;
use crate::persist::{ensure_output_dir, AtomicFileWriter};
use crate::positions::PositionAggregator;
use crate::{HarvestError, PlatformSettings};

/// Items of a single requested page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageHarvest {
    pub reported_total: Option<u64>,
    pub items: Vec<HarvestedItem>,
}

/// Outcome of [`HarvestSession::save_resumes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveSummary {
    pub written: usize,
    pub missing: usize,
}

/// Outcome of [`verify_login`], ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub report: LoginReport,
    pub exit_code: i32,
}

#[derive(Debug)]
pub struct HarvestSession {
    client: PlatformClient,
    session: Session,
    endpoints: EndpointTokenResolver,
    options: HarvestOptions,
}

impl HarvestSession {
    /// Builds the client and logs in. Nothing past login runs here.
    pub async fn connect(
        settings: PlatformSettings,
        corp_code: &str,
        identity: Identity,
        options: HarvestOptions,
    ) -> Result<Self, HarvestError> {
        let client = PlatformClient::new(settings)?;
        let session = SessionAuthenticator::new(client.clone())
            .establish(corp_code, identity)
            .await?;
        Ok(Self::from_parts(client, session, options))
    }

    pub fn from_parts(client: PlatformClient, session: Session, options: HarvestOptions) -> Self {
        let endpoints = EndpointTokenResolver::new(client.clone());
        Self {
            client,
            session,
            endpoints,
            options,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &PlatformClient {
        &self.client
    }

    pub fn endpoints(&self) -> &EndpointTokenResolver {
        &self.endpoints
    }

    /// Resolves every operation up front. Only a list failure is fatal;
    /// document endpoints are retried lazily per record.
    pub async fn prepare(&mut self) -> Result<(), HarvestError> {
        for operation in Operation::ALL {
            match self.endpoints.resolve(operation).await {
                Ok(_) => {}
                Err(err) if operation == Operation::CandidateList => return Err(err),
                Err(err) => harvest_warn!("{}; will retry per record", err),
            }
        }
        Ok(())
    }

    /// Full traversal, every record correlated.
    pub async fn harvest_all(&mut self) -> Result<Vec<HarvestedItem>, HarvestError> {
        self.prepare().await?;
        let correlator = CandidateCorrelator::new(&self.client);
        let mut pager = Paginator::new(&self.options);
        let mut items = Vec::new();

        while let Some(page) = pager.next_page(&self.client, &mut self.endpoints).await? {
            for record in page.records {
                items.push(correlator.correlate(&mut self.endpoints, record).await);
            }
        }

        harvest_info!(
            "Harvested {} candidates ({} resumes, {} job descriptions)",
            items.len(),
            items.iter().filter(|i| i.resume.is_some()).count(),
            items.iter().filter(|i| i.job_description.is_some()).count()
        );
        Ok(items)
    }

    /// One page only, 1-based.
    pub async fn harvest_page(&mut self, page_no: u32) -> Result<PageHarvest, HarvestError> {
        self.prepare().await?;
        let correlator = CandidateCorrelator::new(&self.client);
        let page = Paginator::new(&self.options)
            .fetch_page(&self.client, &mut self.endpoints, page_no.max(1))
            .await?;

        let mut items = Vec::with_capacity(page.records.len());
        for record in page.records {
            items.push(correlator.correlate(&mut self.endpoints, record).await);
        }
        Ok(PageHarvest {
            reported_total: page.total,
            items,
        })
    }

    /// Deduplicated job list in first-seen order.
    pub async fn aggregate_positions(&mut self) -> Result<Vec<PositionAggregate>, HarvestError> {
        self.prepare().await?;
        let mut positions = PositionAggregator::new(&self.client);
        let mut pager = Paginator::new(&self.options);

        while let Some(page) = pager.next_page(&self.client, &mut self.endpoints).await? {
            for record in &page.records {
                positions.absorb(&mut self.endpoints, record).await;
            }
        }

        harvest_info!(
            "Aggregated {} positions from {} candidates",
            positions.len(),
            pager.cursor().fetched()
        );
        Ok(positions.finish())
    }

    /// Full traversal writing each available resume into `dir`.
    pub async fn save_resumes(&mut self, dir: &Path) -> Result<SaveSummary, HarvestError> {
        ensure_output_dir(dir)?;
        self.prepare().await?;
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        let correlator = CandidateCorrelator::new(&self.client);
        let mut pager = Paginator::new(&self.options);
        let mut summary = SaveSummary::default();

        while let Some(page) = pager.next_page(&self.client, &mut self.endpoints).await? {
            for record in &page.records {
                let Some(bytes) = correlator.fetch_resume(&mut self.endpoints, record).await
                else {
                    summary.missing += 1;
                    continue;
                };
                let filename = resume_filename(
                    record.display_name.as_deref(),
                    record.apply_id.as_deref().unwrap_or_default(),
                );
                writer.write(&filename, &bytes)?;
                summary.written += 1;
            }
        }

        harvest_info!(
            "Saved {} resumes to {} ({} unavailable)",
            summary.written,
            dir.display(),
            summary.missing
        );
        Ok(summary)
    }
}

/// Login-only check. Requires a username and password from `sources` or the
/// environment.
pub async fn verify_login(
    settings: PlatformSettings,
    corp_code: &str,
    sources: CredentialSources,
) -> LoginOutcome {
    verify_login_with(settings, corp_code, sources, |key| std::env::var(key).ok()).await
}

/// [`verify_login`] with an explicit environment lookup.
pub async fn verify_login_with(
    settings: PlatformSettings,
    corp_code: &str,
    sources: CredentialSources,
    lookup: impl Fn(&str) -> Option<String>,
) -> LoginOutcome {
    match try_login(settings, corp_code, sources, lookup).await {
        Ok(username) => LoginOutcome {
            report: LoginReport::Success {
                user: LoginUser {
                    corp_code: corp_code.to_string(),
                    username,
                },
            },
            exit_code: 0,
        },
        Err(err) => LoginOutcome {
            exit_code: err.category().exit_code(),
            report: LoginReport::Error {
                message: err.to_string(),
            },
        },
    }
}

async fn try_login(
    settings: PlatformSettings,
    corp_code: &str,
    sources: CredentialSources,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, HarvestError> {
    let Identity::Credentials { username, password } =
        sources.resolve_credentials_with(lookup)?
    else {
        return Err(HarvestError::MissingCredentials);
    };
    let client = PlatformClient::new(settings)?;
    SessionAuthenticator::new(client)
        .login(corp_code, &username, &password)
        .await?;
    Ok(username)
}
