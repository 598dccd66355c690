use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to report when a layer failed and no layer flagged the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Unknown is legitimate.
    #[default]
    FailOpen,
    /// Unknown is disposable.
    FailClosed,
}

/// Layers consulted by [`DisposableClassifier`](super::DisposableClassifier).
/// The cache and the store are always consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierOptions {
    pub use_static_list: bool,
    pub use_remote_api: bool,
    pub use_ip_gating: bool,
    pub failure_policy: FailurePolicy,
    pub store_timeout: Duration,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            use_static_list: true,
            use_remote_api: true,
            use_ip_gating: true,
            failure_policy: FailurePolicy::FailOpen,
            store_timeout: Duration::from_secs(2),
        }
    }
}
