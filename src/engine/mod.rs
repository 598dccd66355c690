//! Verification engine.
//!
//! Syntax is checked first and short-circuits. For a well-formed address the
//! disposable classification (fed by the IPv4 lookup) runs concurrently with
//! the MX lookup, which in turn feeds the optional reachability probe. `verify`
//! waits for both branches and never fails.

mod builder;
mod options;
mod types;

pub use builder::EngineBuilder;
pub use options::EnabledChecks;
pub use types::{
    DISPOSABLE_MESSAGE, MX_MESSAGE, RECEIVE_MESSAGE, SYNTAX_MESSAGE, VerificationErrors,
    VerificationResult,
};

use std::net::IpAddr;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::disposable::DisposableClassifier;
use crate::dns::MailDns;
use crate::smtp_verify::MailServerProber;
use crate::validator::{ValidationMode, is_valid_email, normalize_email};

pub struct VerificationEngine {
    dns: MailDns,
    classifier: DisposableClassifier,
    prober: MailServerProber,
    checks: EnabledChecks,
}

impl VerificationEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Production wiring: system or configured resolver, JSON or in-memory store,
    /// static list, HTTP classification API and TCP prober.
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        EngineBuilder::from_config(config).await?.build()
    }

    pub fn checks(&self) -> &EnabledChecks {
        &self.checks
    }

    pub fn dns(&self) -> &MailDns {
        &self.dns
    }

    pub async fn verify(&self, email: &str) -> VerificationResult {
        let email = email.trim();
        let probe_enabled = self.checks.use_reachability_probe;

        if !is_valid_email(email) {
            let result = VerificationResult::invalid_syntax(probe_enabled);
            log_summary(email, &result);
            return result;
        }
        let domain = normalize_email(email, ValidationMode::Strict).ascii_domain;

        let classify = async {
            let ip = if self.checks.needs_ip_lookup() {
                self.dns.resolve_ipv4(&domain).await
            } else {
                None
            };
            let gate_ip = ip.filter(|_| self.checks.use_ip_gating).map(IpAddr::V4);
            let disposable = self.classifier.classify(email, gate_ip).await;
            (disposable, ip)
        };
        let mx_and_reach = async {
            let records = self.dns.resolve_mx(&domain).await;
            let reachable = if probe_enabled {
                Some(self.prober.probe_records(&domain, &records).await)
            } else {
                None
            };
            (records, reachable)
        };

        let ((is_disposable, ip), (mx_records, can_receive_email)) =
            tokio::join!(classify, mx_and_reach);
        debug!(domain = %domain, mx_count = mx_records.len(), "checks settled");

        let reported_ip = ip.filter(|_| self.checks.resolve_ip_address);
        let result = VerificationResult::from_checks(
            is_disposable,
            !mx_records.is_empty(),
            reported_ip,
            can_receive_email,
        );
        log_summary(email, &result);
        result
    }
}

fn log_summary(email: &str, result: &VerificationResult) {
    match serde_json::to_string(result) {
        Ok(summary) => info!(email, result = %summary, "email verification result"),
        Err(err) => warn!(email, error = %err, "cannot serialize verification result"),
    }
}

#[cfg(test)]
mod tests;
