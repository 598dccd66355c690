use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::resolver::{MailResolver, normalize_domain, order_records};
use super::{DnsError, LookupFailure, MxRecord, MxStatus};

/// Fail-closed DNS checks for the engine. Every lookup is bounded by `timeout`;
/// errors are logged with their classification and turned into "nothing found".
#[derive(Clone)]
pub struct MailDns {
    resolver: Arc<dyn MailResolver>,
    timeout: Duration,
}

impl MailDns {
    pub fn new(resolver: Arc<dyn MailResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    /// MX records for `domain`, ordered by ascending preference. Empty on any failure.
    pub async fn resolve_mx(&self, domain: &str) -> Vec<MxRecord> {
        match self.lookup_mx_status(domain).await {
            Ok(status) => status.records().to_vec(),
            Err(err) => {
                match err.failure() {
                    Some(failure) if failure.is_definitive() => {
                        warn!(domain, kind = %failure, "no MX records");
                    }
                    Some(failure) => {
                        error!(domain, kind = %failure, "MX record check failed");
                    }
                    None => error!(domain, error = %err, "MX record check failed"),
                }
                Vec::new()
            }
        }
    }

    /// Classified MX lookup. `NoData` answers come back as [`MxStatus::NoRecords`].
    pub async fn lookup_mx_status(&self, domain: &str) -> Result<MxStatus, DnsError> {
        let ascii = normalize_domain(domain)?;
        let records = match tokio::time::timeout(self.timeout, self.resolver.lookup_mx(&ascii)).await
        {
            Ok(Ok(records)) => records,
            Ok(Err(err)) if err.failure() == Some(&LookupFailure::NoData) => Vec::new(),
            Ok(Err(err)) => return Err(err),
            Err(_) => return Err(DnsError::lookup("MX", &ascii, LookupFailure::Timeout)),
        };

        let records = order_records(records);
        debug!(domain = %ascii, count = records.len(), "MX lookup complete");
        if records.is_empty() {
            Ok(MxStatus::NoRecords)
        } else {
            Ok(MxStatus::Records(records))
        }
    }

    /// First IPv4 address of the domain's likely mail host: `mail.<domain>` is
    /// tried before `<domain>`.
    pub async fn resolve_ipv4(&self, domain: &str) -> Option<Ipv4Addr> {
        let ascii = match normalize_domain(domain) {
            Ok(ascii) => ascii,
            Err(err) => {
                error!(domain, error = %err, "IP address check skipped");
                return None;
            }
        };

        let mail_host = format!("mail.{ascii}");
        for name in [mail_host.as_str(), ascii.as_str()] {
            if let Some(ip) = self.first_ipv4(name).await {
                return Some(ip);
            }
        }
        None
    }

    async fn first_ipv4(&self, name: &str) -> Option<Ipv4Addr> {
        let result = match tokio::time::timeout(self.timeout, self.resolver.lookup_ipv4(name)).await
        {
            Ok(result) => result,
            Err(_) => Err(DnsError::lookup("A", name, LookupFailure::Timeout)),
        };

        match result {
            Ok(addrs) => {
                let first = addrs.first().copied();
                if first.is_none() {
                    warn!(domain = name, "no A records found");
                }
                first
            }
            Err(err) => {
                match err.failure() {
                    Some(failure) if failure.is_definitive() => {
                        warn!(domain = name, kind = %failure, "no A records found");
                    }
                    _ => error!(domain = name, error = %err, "IP address check failed"),
                }
                None
            }
        }
    }
}
