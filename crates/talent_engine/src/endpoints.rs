use std::collections::HashMap;

use async_trait::async_trait;
use talent_core::Operation;
use talent_logging::{harvest_debug, harvest_info};
use url::Url;

use crate::client::PlatformClient;
use crate::HarvestError;

/// A signed, operation-scoped absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub operation: Operation,
    pub url: Url,
}

/// Supplies resolved endpoints and accepts invalidation when one goes stale.
///
/// The platform gives no expiry hint, so staleness is only ever detected by an
/// authorization failure on use.
#[async_trait]
pub trait EndpointSource: Send {
    /// Cached endpoint for `operation`, resolving it first if needed.
    async fn resolve(&mut self, operation: Operation) -> Result<ResolvedEndpoint, HarvestError>;

    /// Drops the cached endpoint for `operation`.
    fn invalidate(&mut self, operation: Operation);
}

/// Exchanges the session for signed URLs, one cache slot per operation.
#[derive(Debug)]
pub struct EndpointTokenResolver {
    client: PlatformClient,
    cache: HashMap<Operation, ResolvedEndpoint>,
    issued: usize,
}

impl EndpointTokenResolver {
    pub fn new(client: PlatformClient) -> Self {
        Self {
            client,
            cache: HashMap::new(),
            issued: 0,
        }
    }

    pub fn cached(&self, operation: Operation) -> Option<&ResolvedEndpoint> {
        self.cache.get(&operation)
    }

    /// Number of token-issuing calls made so far.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Always issues a fresh token and overwrites the cache slot.
    pub async fn refresh(
        &mut self,
        operation: Operation,
    ) -> Result<ResolvedEndpoint, HarvestError> {
        let path = self.client.settings().operation_path(operation).to_string();
        self.issued += 1;
        let issued = self.client.issue_token(&path).await.map_err(|err| {
            HarvestError::EndpointUnavailable {
                operation,
                reason: err.to_string(),
            }
        })?;
        let url = issued.ok_or_else(|| HarvestError::EndpointUnavailable {
            operation,
            reason: "token response carried no tokenUrl".to_string(),
        })?;

        harvest_info!("Resolved {} endpoint", operation);
        let endpoint = ResolvedEndpoint { operation, url };
        self.cache.insert(operation, endpoint.clone());
        Ok(endpoint)
    }
}

#[async_trait]
impl EndpointSource for EndpointTokenResolver {
    async fn resolve(&mut self, operation: Operation) -> Result<ResolvedEndpoint, HarvestError> {
        if let Some(endpoint) = self.cache.get(&operation) {
            return Ok(endpoint.clone());
        }
        self.refresh(operation).await
    }

    fn invalidate(&mut self, operation: Operation) {
        if self.cache.remove(&operation).is_some() {
            harvest_debug!("Invalidated {} endpoint", operation);
        }
    }
}
