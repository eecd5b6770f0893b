use std::fmt;

use serde_json::Value;
use talent_logging::{harvest_debug, harvest_info, harvest_warn};

use crate::cipher::{encrypt_credential, ensure_supported_cipher};
use crate::client::PlatformClient;
use crate::{FailureKind, FetchError, HarvestError};

pub const ENV_USERNAME: &str = "WT_USERNAME";
pub const ENV_PASSWORD: &str = "WT_PASSWORD";
pub const ENV_SESSION: &[&str] = &["WT_SESSION", "SESSION"];

/// Identity material as supplied by the caller, before resolution.
#[derive(Clone, Default)]
pub struct CredentialSources {
    pub session_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for CredentialSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSources")
            .field("session_token", &self.session_token.is_some())
            .field("username", &self.username)
            .field("password", &self.password.is_some())
            .finish()
    }
}

/// How a run proves who it is.
#[derive(Clone, PartialEq, Eq)]
pub enum Identity {
    Credentials { username: String, password: String },
    SessionToken(String),
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Credentials { username, .. } => f
                .debug_struct("Credentials")
                .field("username", username)
                .finish_non_exhaustive(),
            Identity::SessionToken(_) => f.write_str("SessionToken(..)"),
        }
    }
}

impl CredentialSources {
    /// Resolves against the process environment.
    pub fn resolve(self) -> Result<Identity, HarvestError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves using `lookup` for environment fallbacks.
    ///
    /// Order: explicit session token, then username and password (explicit or
    /// environment), then an environment session token. Empty values count as
    /// absent.
    pub fn resolve_with(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Identity, HarvestError> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        if let Some(token) = non_empty(self.session_token) {
            return Ok(Identity::SessionToken(token));
        }

        let username = non_empty(self.username).or_else(|| non_empty(lookup(ENV_USERNAME)));
        let password = non_empty(self.password).or_else(|| non_empty(lookup(ENV_PASSWORD)));
        if let (Some(username), Some(password)) = (username, password) {
            return Ok(Identity::Credentials { username, password });
        }

        ENV_SESSION
            .iter()
            .find_map(|key| non_empty(lookup(key)))
            .map(Identity::SessionToken)
            .ok_or(HarvestError::MissingCredentials)
    }

    /// Like [`resolve_with`](Self::resolve_with) but only accepts a username
    /// and password; session tokens are ignored.
    pub fn resolve_credentials_with(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Identity, HarvestError> {
        CredentialSources {
            session_token: None,
            ..self
        }
        .resolve_with(|key| match key {
            ENV_USERNAME | ENV_PASSWORD => lookup(key),
            _ => None,
        })
    }
}

/// Proof of a successful login, immutable for the rest of the run.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    identity: String,
    corp_code: String,
}

impl Session {
    /// Fails fast on an empty identity.
    pub fn new(
        identity: impl Into<String>,
        corp_code: impl Into<String>,
    ) -> Result<Self, HarvestError> {
        let identity = identity.into();
        if identity.is_empty() {
            return Err(HarvestError::LoginRejected {
                message: Some("empty session identity".to_string()),
            });
        }
        Ok(Self {
            identity,
            corp_code: corp_code.into(),
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn corp_code(&self) -> &str {
        &self.corp_code
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity_len", &self.identity.len())
            .field("corp_code", &self.corp_code)
            .finish()
    }
}

/// Runs the two-step login handshake against the platform.
#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    client: PlatformClient,
}

impl SessionAuthenticator {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Establishes a session from a resolved identity. A session token is
    /// installed directly without any network call.
    pub async fn establish(
        &self,
        corp_code: &str,
        identity: Identity,
    ) -> Result<Session, HarvestError> {
        match identity {
            Identity::SessionToken(token) => {
                harvest_info!("Using supplied session token for corp {}", corp_code);
                self.client.set_session_cookie(&token);
                Session::new(token, corp_code)
            }
            Identity::Credentials { username, password } => {
                self.login(corp_code, &username, &password).await
            }
        }
    }

    pub async fn login(
        &self,
        corp_code: &str,
        username: &str,
        password: &str,
    ) -> Result<Session, HarvestError> {
        let metadata = self.client.login_info(corp_code).await.map_err(metadata_error)?;
        ensure_supported_cipher(metadata.cipher_indicator().as_deref())?;

        let key = metadata.encryption_key().unwrap_or_default();
        let encrypted = encrypt_credential(password, &key)?;
        harvest_debug!(
            "Encrypted password for {} ({} hex chars)",
            username,
            encrypted.len()
        );

        let response = self
            .client
            .submit_login(corp_code, username, &encrypted, &metadata.time_sign())
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::LoginRejected {
                message: Some(format!("HTTP {}", status.as_u16())),
            });
        }

        let name = self.client.settings().session_cookie_name.as_str();
        let issued = response
            .cookies()
            .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
            .map(|cookie| cookie.value().to_string());

        match issued.or_else(|| self.client.session_cookie()) {
            Some(identity) => {
                harvest_info!("Logged in as {} for corp {}", username, corp_code);
                Session::new(identity, corp_code)
            }
            None => {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        harvest_debug!("Login response body unreadable: {}", err.without_url());
                        String::new()
                    }
                };
                let message = rejection_message(&body);
                harvest_warn!(
                    "Login for {} returned no session cookie: {}",
                    username,
                    message.as_deref().unwrap_or("no message")
                );
                Err(HarvestError::LoginRejected { message })
            }
        }
    }
}

fn metadata_error(err: FetchError) -> HarvestError {
    match err.kind {
        FailureKind::Network | FailureKind::Timeout => HarvestError::Network(err),
        FailureKind::HttpStatus(status) | FailureKind::PermissionDenied(status) => {
            HarvestError::LoginInfoUnavailable(format!("HTTP {status}"))
        }
        FailureKind::Decode => {
            HarvestError::LoginInfoUnavailable("unparseable login metadata".to_string())
        }
        _ => HarvestError::LoginInfoUnavailable(err.to_string()),
    }
}

fn rejection_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}
