use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::op::ResponseCode,
};

use super::{DnsError, LookupFailure, MxRecord};

/// Record lookups the adapter needs. Implemented over trust-dns for production
/// and by stubs in tests.
#[async_trait]
pub trait MailResolver: Send + Sync {
    /// MX records for `name`, in whatever order the server returned them.
    async fn lookup_mx(&self, name: &str) -> Result<Vec<MxRecord>, DnsError>;

    async fn lookup_ipv4(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsError>;
}

/// Async resolver backed by `trust_dns_resolver`.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Uses the system resolver configuration (`/etc/resolv.conf` on unix).
    pub fn from_system_conf(timeout: Duration, attempts: usize) -> Result<Self, DnsError> {
        let (config, mut opts) =
            trust_dns_resolver::system_conf::read_system_conf().map_err(DnsError::resolver_init)?;
        opts.timeout = timeout;
        opts.attempts = attempts;
        Ok(Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        })
    }

    /// Queries the given name servers (port 53, UDP with TCP fallback).
    pub fn with_name_servers(
        servers: &[String],
        timeout: Duration,
        attempts: usize,
    ) -> Result<Self, DnsError> {
        let ips = servers
            .iter()
            .map(|s| {
                s.parse::<IpAddr>()
                    .map_err(|_| DnsError::NameServer(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
        let config = ResolverConfig::from_parts(None, Vec::new(), group);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = attempts;
        Ok(Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        })
    }
}

#[async_trait]
impl MailResolver for SystemResolver {
    async fn lookup_mx(&self, name: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = self
            .inner
            .mx_lookup(name)
            .await
            .map_err(|err| DnsError::lookup("MX", name, classify(&err)))?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .collect())
    }

    async fn lookup_ipv4(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        let lookup = self
            .inner
            .ipv4_lookup(name)
            .await
            .map_err(|err| DnsError::lookup("A", name, classify(&err)))?;
        Ok(lookup.iter().map(|a| a.0).collect())
    }
}

pub(crate) fn classify(err: &ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                LookupFailure::NxDomain
            } else {
                LookupFailure::NoData
            }
        }
        ResolveErrorKind::Timeout => LookupFailure::Timeout,
        _ => LookupFailure::Transient(err.to_string()),
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(DnsError::idna)
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// Sorts by preference and drops duplicates.
pub(crate) fn order_records(mut records: Vec<MxRecord>) -> Vec<MxRecord> {
    records.sort();
    records.dedup();
    records
}
