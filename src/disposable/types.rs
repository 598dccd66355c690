use std::fmt;

use serde::{Deserialize, Serialize};

/// Which layer flagged an address as disposable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Cache,
    Store,
    StaticList,
    Remote,
    IpAddress,
    /// A layer failed and the policy treats unknown as disposable.
    FailClosed,
}

impl fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cache => "cache",
            Self::Store => "store",
            Self::StaticList => "static list",
            Self::Remote => "remote API",
            Self::IpAddress => "known disposable IP",
            Self::FailClosed => "fail-closed policy",
        };
        f.write_str(label)
    }
}

/// Persisted classification. Once written it is never revised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisposableRecord {
    pub domain: String,
    pub source: ClassificationSource,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
}

impl DisposableRecord {
    pub fn new(domain: impl Into<String>, source: ClassificationSource) -> Self {
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            domain: domain.into(),
            source,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}
