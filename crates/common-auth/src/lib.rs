//! Authentication primitives for API request checks.
//!
//! The [`DefaultApiAuthenticator`] is a placeholder: it records the request
//! it was asked about and accepts it without consulting its credential
//! storage. It must be replaced before any real use.

mod authenticator;
mod request;
mod storage;
mod token;

use thiserror::Error;

pub use authenticator::{ApiAuthenticator, DefaultApiAuthenticator};
pub use request::ApiRequest;
pub use storage::{CredentialStorage, MemoryCredentialStorage};
pub use token::{
    AuthToken, Clock, ExpiryMode, ExpiryPolicy, FixedClock, SystemClock, TimeResolution,
    DEFAULT_EXPIRE_INTERVAL,
};

/// Failure kinds a credential-checking authenticator reports.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request URL is missing parts required for authentication.
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    /// No credential is stored for the application.
    #[error("no credential stored for app id {0}")]
    CredentialNotFound(String),
    /// The request token does not match the one derived from the credential.
    #[error("credential mismatch for app id {0}")]
    CredentialMismatch(String),
    /// The credential backend itself failed.
    #[error("credential storage failure: {0}")]
    Storage(String),
}
