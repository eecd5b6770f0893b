//! Talent engine: the authenticated, token-gated HTTP pipeline.
mod api;
mod auth;
mod cipher;
mod client;
mod correlate;
mod endpoints;
mod error;
mod filename;
mod harvest;
mod pagination;
mod persist;
mod positions;
mod recovery;
mod settings;
mod types;

pub use api::{ListQuery, LoginMetadata};
pub use auth::{
    CredentialSources, Identity, Session, SessionAuthenticator, ENV_PASSWORD, ENV_SESSION,
    ENV_USERNAME,
};
pub use cipher::{encrypt_credential, ensure_supported_cipher, CipherError};
pub use client::PlatformClient;
pub use correlate::CandidateCorrelator;
pub use endpoints::{EndpointSource, EndpointTokenResolver, ResolvedEndpoint};
pub use error::{FailureCategory, HarvestError};
pub use filename::resume_filename;
pub use harvest::{
    verify_login, verify_login_with, HarvestSession, LoginOutcome, PageHarvest, SaveSummary,
};
pub use pagination::Paginator;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use positions::PositionAggregator;
pub use recovery::with_permission_recovery;
pub use settings::{PlatformSettings, RetrySettings, DEFAULT_BASE_URL};
pub use types::{FailureKind, FetchError};
