use serde::{Deserialize, Serialize};

/// Checks a [`VerificationEngine`](super::VerificationEngine) runs besides
/// syntax and MX, which always run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledChecks {
    pub use_static_list: bool,
    pub use_remote_api: bool,
    pub use_reachability_probe: bool,
    pub use_ip_gating: bool,
    pub resolve_ip_address: bool,
}

impl Default for EnabledChecks {
    fn default() -> Self {
        Self {
            use_static_list: true,
            use_remote_api: true,
            use_reachability_probe: false,
            use_ip_gating: true,
            resolve_ip_address: true,
        }
    }
}

impl EnabledChecks {
    /// IP gating needs the address even when it is not reported.
    pub fn needs_ip_lookup(&self) -> bool {
        self.resolve_ip_address || self.use_ip_gating
    }
}
