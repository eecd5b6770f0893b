use talent_core::Operation;
use thiserror::Error;

use crate::cipher::CipherError;
use crate::persist::PersistError;
use crate::types::FetchError;

/// Phase-level harvest failure.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no credentials: provide username and password, a session cookie, or WT_SESSION")]
    MissingCredentials,
    #[error("credential encryption misconfigured: {0}")]
    EncryptionConfig(#[from] CipherError),
    #[error("server requires unsupported password cipher (indicator {indicator})")]
    UnsupportedCipher { indicator: String },
    #[error("login metadata unavailable: {0}")]
    LoginInfoUnavailable(String),
    #[error("login rejected: {}", .message.as_deref().unwrap_or("no session cookie returned"))]
    LoginRejected { message: Option<String> },
    #[error("{operation} endpoint unavailable: {reason}")]
    EndpointUnavailable { operation: Operation, reason: String },
    #[error("{operation} permission denied (http {status}) after re-resolving its token")]
    PermissionDenied { operation: Operation, status: u16 },
    #[error("network failure: {0}")]
    Network(#[from] FetchError),
    #[error("persist failure: {0}")]
    Persist(#[from] PersistError),
}

impl HarvestError {
    /// Maps the final failure of a fetch on `operation` into the taxonomy.
    pub(crate) fn from_fetch(operation: Operation, err: FetchError) -> Self {
        match err.kind {
            crate::FailureKind::PermissionDenied(status) => {
                HarvestError::PermissionDenied { operation, status }
            }
            _ => HarvestError::Network(err),
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            HarvestError::UnsupportedCipher { .. }
            | HarvestError::EncryptionConfig(CipherError::EmptyKey) => {
                FailureCategory::UnsupportedCipher
            }
            HarvestError::Network(err) if err.is_transport() => FailureCategory::Network,
            _ => FailureCategory::Generic,
        }
    }
}

/// Coarse failure class for callers that branch on cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Generic,
    Network,
    UnsupportedCipher,
}

impl FailureCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            FailureCategory::Generic => 1,
            FailureCategory::Network => 2,
            FailureCategory::UnsupportedCipher => 3,
        }
    }
}
