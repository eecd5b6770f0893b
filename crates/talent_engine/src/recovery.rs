use std::future::Future;

use talent_core::Operation;
use talent_logging::harvest_warn;
use url::Url;

use crate::endpoints::EndpointSource;
use crate::{FetchError, HarvestError};

/// Runs `fetch` against the endpoint for `operation`, surviving one token
/// expiry.
///
/// On an authorization failure the endpoint is invalidated, resolved once
/// more and `fetch` is retried exactly once against the new URL. Any other
/// failure is returned without a retry, and so is a failed retry.
pub async fn with_permission_recovery<S, T, F, Fut>(
    endpoints: &mut S,
    operation: Operation,
    mut fetch: F,
) -> Result<T, HarvestError>
where
    S: EndpointSource + ?Sized,
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let endpoint = endpoints.resolve(operation).await?;
    match fetch(endpoint.url).await {
        Ok(value) => return Ok(value),
        Err(err) if err.is_permission_denied() => {
            harvest_warn!("{} token rejected ({}); re-resolving once", operation, err.kind);
        }
        Err(err) => return Err(HarvestError::from_fetch(operation, err)),
    }

    endpoints.invalidate(operation);
    let endpoint = endpoints.resolve(operation).await?;
    fetch(endpoint.url)
        .await
        .map_err(|err| HarvestError::from_fetch(operation, err))
}
