use std::sync::Arc;

use tracing::{debug, warn};

use crate::dns::{MailDns, MxRecord};
use crate::validator::domain_of;

use super::session::{SmtpConnector, SmtpSession};
use super::{ProbeError, ProbeOptions, ProbeReport, ProbeStage};

/// Connect-and-greet check against a domain's primary mail exchanger.
///
/// Reads the greeting, introduces itself with `EHLO` (falling back to `HELO`)
/// and quits. No envelope is ever sent.
pub struct MailServerProber {
    dns: MailDns,
    connector: Arc<dyn SmtpConnector>,
    options: ProbeOptions,
}

impl MailServerProber {
    pub fn new(dns: MailDns, connector: Arc<dyn SmtpConnector>, options: ProbeOptions) -> Self {
        Self {
            dns,
            connector,
            options,
        }
    }

    /// `true` when the primary exchanger for the address's domain completed the
    /// greeting. Disabled probes and every failure yield `false`.
    pub async fn probe(&self, email: &str) -> bool {
        if !self.options.enabled {
            return false;
        }
        let Some(domain) = domain_of(email) else {
            warn!(email, error = %ProbeError::MissingDomain, "reachability probe skipped");
            return false;
        };
        let records = self.dns.resolve_mx(&domain).await;
        self.probe_records(&domain, &records).await
    }

    /// [`probe`](Self::probe) for a domain whose MX records are already resolved.
    pub async fn probe_records(&self, domain: &str, records: &[MxRecord]) -> bool {
        if !self.options.enabled {
            return false;
        }
        match self.converse(domain, records).await {
            Ok(report) => {
                debug!(domain, host = %report.host, "mail server accepted connection");
                true
            }
            Err(err) => {
                warn!(domain, error = %err, "reachability probe failed");
                false
            }
        }
    }

    /// Runs the dialogue against the lowest-preference MX host of `domain`.
    pub async fn probe_domain(&self, domain: &str) -> Result<ProbeReport, ProbeError> {
        let records = self.dns.resolve_mx(domain).await;
        self.converse(domain, &records).await
    }

    /// `records` must be ordered by preference.
    async fn converse(&self, domain: &str, records: &[MxRecord]) -> Result<ProbeReport, ProbeError> {
        let host = records
            .iter()
            .find(|record| !record.exchange.is_empty())
            .map(|record| record.exchange.clone())
            .ok_or_else(|| ProbeError::NoMailExchanger {
                domain: domain.to_string(),
            })?;

        let stream = self
            .connector
            .connect(&host, self.options.port, self.options.connect_timeout)
            .await?;
        let mut session = SmtpSession::new(stream, self.options.command_timeout);

        let greeting = session.read_banner().await?;
        if !greeting.is_positive_completion() {
            session.quit().await;
            return Err(ProbeError::Rejected {
                stage: ProbeStage::Greeting,
                code: greeting.code,
            });
        }

        let helo = self.options.helo_name(domain);
        let mut hello = session
            .send_command(&format!("EHLO {helo}"), ProbeStage::Hello)
            .await?;
        if hello.is_permanent_failure() {
            hello = session
                .send_command(&format!("HELO {helo}"), ProbeStage::Hello)
                .await?;
        }
        session.quit().await;

        if !hello.is_positive_completion() {
            return Err(ProbeError::Rejected {
                stage: ProbeStage::Hello,
                code: hello.code,
            });
        }

        Ok(ProbeReport {
            host,
            greeting,
            hello,
        })
    }
}
