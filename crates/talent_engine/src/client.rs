use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::{RequestBuilder, Response, StatusCode};
use talent_logging::{harvest_debug, harvest_warn};
use url::Url;

use crate::{FailureKind, FetchError, PlatformSettings};

/// Cookie-carrying HTTP client bound to one platform deployment.
///
/// Clones share the cookie jar, so every component of a run sees the same
/// session.
#[derive(Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    settings: Arc<PlatformSettings>,
}

impl fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl PlatformClient {
    pub fn new(settings: PlatformSettings) -> Result<Self, FetchError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));
        if let Ok(origin) = HeaderValue::from_str(&base.origin().ascii_serialization()) {
            headers.insert(ORIGIN, origin);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            http,
            jar,
            base,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for a platform path or an already absolute URL.
    pub fn endpoint(&self, path_or_url: &str) -> Result<Url, FetchError> {
        let joined = if path_or_url.starts_with("http://") || path_or_url.starts_with("https://")
        {
            Url::parse(path_or_url)
        } else {
            self.base.join(path_or_url)
        };
        joined.map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Referer header value the browser client would send from `path`.
    pub(crate) fn referer(&self, path: &str) -> String {
        format!("{}{}", self.base.origin().ascii_serialization(), path)
    }

    /// Places an existing session identity in the jar.
    pub fn set_session_cookie(&self, value: &str) {
        let cookie = format!("{}={}; Path=/", self.settings.session_cookie_name, value);
        self.jar.add_cookie_str(&cookie, &self.base);
    }

    /// Current session identity held in the jar, if any.
    ///
    /// The cookie may be scoped below `/`, so the login path is consulted
    /// as well as the base URL.
    pub fn session_cookie(&self) -> Option<String> {
        let scoped = self.endpoint(&self.settings.login_path).ok();
        std::iter::once(&self.base)
            .chain(scoped.as_ref())
            .find_map(|url| self.session_cookie_at(url))
    }

    fn session_cookie_at(&self, url: &Url) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let header = header.to_str().ok()?;
        let name = self.settings.session_cookie_name.as_str();
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Sends the request built by `build`, retrying throttling, server errors
    /// and dropped connections with exponential backoff. `build` runs once per
    /// attempt because multipart bodies cannot be cloned.
    pub(crate) async fn send<F>(&self, build: F) -> Result<Response, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        let retry = &self.settings.retry;
        let mut attempt = 0;
        loop {
            let result = build().send().await;
            let retryable = match &result {
                Ok(response) => retry.retry_statuses.contains(&response.status().as_u16()),
                Err(err) => err.is_connect() || err.is_timeout(),
            };
            if !retryable || attempt >= retry.max_retries {
                return result.map_err(map_reqwest_error);
            }

            attempt += 1;
            let delay = retry.backoff(attempt);
            match &result {
                Ok(response) => harvest_warn!(
                    "HTTP {} from {}; retry {}/{} in {}ms",
                    response.status().as_u16(),
                    response.url().path(),
                    attempt,
                    retry.max_retries,
                    delay.as_millis()
                ),
                Err(err) => harvest_warn!(
                    "Request failed ({}); retry {}/{} in {}ms",
                    map_reqwest_error_kind(err),
                    attempt,
                    retry.max_retries,
                    delay.as_millis()
                ),
            }
            tokio::time::sleep(delay).await;
        }
    }

    /// Like [`send`](Self::send) but fails on non-success statuses, mapping
    /// 401/403 to [`FailureKind::PermissionDenied`].
    pub(crate) async fn send_checked<F>(&self, build: F) -> Result<Response, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self.send(build).await?;
        check_status(response)
    }

    pub(crate) async fn json_body(response: Response) -> Result<serde_json::Value, FetchError> {
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    /// Streams a binary body, enforcing the resume size cap.
    pub(crate) async fn bytes_body(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_resume_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            buffer.extend_from_slice(&chunk);
        }
        harvest_debug!("Downloaded {} bytes", buffer.len());
        Ok(buffer.to_vec())
    }

    pub(crate) fn accept_json(builder: RequestBuilder) -> RequestBuilder {
        builder.header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
    }

    pub(crate) fn with_referer(&self, builder: RequestBuilder, path: &str) -> RequestBuilder {
        builder.header(REFERER, self.referer(path))
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::new(
            FailureKind::PermissionDenied(status.as_u16()),
            format!("{} rejected authorization", response.url().path()),
        ));
    }
    if !status.is_success() {
        return Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    Ok(response)
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error_kind(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_decode() {
        FailureKind::Decode
    } else if err.is_builder() {
        FailureKind::InvalidUrl
    } else {
        FailureKind::Network
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    FetchError::new(map_reqwest_error_kind(&err), err.without_url().to_string())
}
