use thiserror::Error;

use crate::config::ConfigError;
use crate::disposable::{DenylistError, RemoteError, StoreError};
use crate::dns::DnsError;

/// Failures while assembling an engine. Verification itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("DNS resolver setup failed: {0}")]
    Resolver(#[from] DnsError),
    #[error("classification API client setup failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("disposable domain store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("static disposable list unavailable: {0}")]
    Denylist(#[from] DenylistError),
}

pub type Result<T> = std::result::Result<T, Error>;
