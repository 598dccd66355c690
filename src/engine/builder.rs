use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{EnabledChecks, VerificationEngine};
use crate::config::Config;
use crate::disposable::{
    ClassifierOptions, DEFAULT_DISPOSABLE_IP, DebounceClient, DisposableCache,
    DisposableClassifier, DisposableIpSet, DomainStore, FailurePolicy, JsonFileStore,
    MemoryStore, RemoteClassifier, StaticDenylist,
};
use crate::dns::{MailDns, MailResolver, SystemResolver};
use crate::smtp_verify::{MailServerProber, ProbeOptions, SmtpConnector, TcpConnector};

const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_DNS_ATTEMPTS: usize = 2;

/// Wires the capability components of a [`VerificationEngine`]. Anything left
/// unset gets a default: system resolver, in-memory store, embedded static
/// list, IP set seeded with [`DEFAULT_DISPOSABLE_IP`], plain TCP connector and
/// no remote classifier.
pub struct EngineBuilder {
    checks: EnabledChecks,
    resolver: Option<Arc<dyn MailResolver>>,
    dns_timeout: Duration,
    store: Option<Arc<dyn DomainStore>>,
    remote: Option<Arc<dyn RemoteClassifier>>,
    denylist: Option<Arc<StaticDenylist>>,
    connector: Option<Arc<dyn SmtpConnector>>,
    cache: Option<Arc<DisposableCache>>,
    ip_set: Option<Arc<DisposableIpSet>>,
    failure_policy: FailurePolicy,
    store_timeout: Duration,
    probe: ProbeOptions,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        let classifier = ClassifierOptions::default();
        Self {
            checks: EnabledChecks::default(),
            resolver: None,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            store: None,
            remote: None,
            denylist: None,
            connector: None,
            cache: None,
            ip_set: None,
            failure_policy: classifier.failure_policy,
            store_timeout: classifier.store_timeout,
            probe: ProbeOptions::default(),
        }
    }

    /// Builder with every component taken from `config`.
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        config.validate()?;
        let d = &config.disposable;

        let resolver: Arc<dyn MailResolver> = if config.dns.name_servers.is_empty() {
            Arc::new(SystemResolver::from_system_conf(
                config.dns_timeout(),
                config.dns.attempts,
            )?)
        } else {
            Arc::new(SystemResolver::with_name_servers(
                &config.dns.name_servers,
                config.dns_timeout(),
                config.dns.attempts,
            )?)
        };

        let store: Arc<dyn DomainStore> = match &d.store_path {
            Some(path) => Arc::new(JsonFileStore::open(path).await?),
            None => Arc::new(MemoryStore::new()),
        };

        let denylist = match &d.static_list_path {
            Some(path) => StaticDenylist::from_file(path)?,
            None => StaticDenylist::embedded(),
        };

        let options = config.classifier_options();
        let mut builder = Self::new()
            .checks(config.enabled_checks())
            .resolver(resolver)
            .dns_timeout(config.dns_timeout())
            .store(store)
            .denylist(Arc::new(denylist))
            .cache(Arc::new(DisposableCache::new(d.cache_capacity)))
            .known_ips(config.known_ips()?)
            .failure_policy(options.failure_policy)
            .store_timeout(options.store_timeout)
            .probe_options(config.probe_options());

        if d.use_remote_api {
            let client = DebounceClient::new(d.remote_endpoint.clone(), config.remote_timeout())?;
            debug!(endpoint = client.endpoint(), "remote classification API enabled");
            builder = builder.remote(Arc::new(client));
        }

        info!(
            remote_api = d.use_remote_api,
            static_list = d.use_static_list,
            smtp_probe = config.smtp.enabled,
            persistent_store = d.store_path.is_some(),
            "verification engine configured"
        );
        Ok(builder)
    }

    pub fn checks(mut self, checks: EnabledChecks) -> Self {
        self.checks = checks;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn MailResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn store(mut self, store: Arc<dyn DomainStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn remote(mut self, remote: Arc<dyn RemoteClassifier>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn denylist(mut self, denylist: Arc<StaticDenylist>) -> Self {
        self.denylist = Some(denylist);
        self
    }

    pub fn connector(mut self, connector: Arc<dyn SmtpConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn cache(mut self, cache: Arc<DisposableCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn ip_set(mut self, ip_set: Arc<DisposableIpSet>) -> Self {
        self.ip_set = Some(ip_set);
        self
    }

    /// IP set holding `ips` on top of [`DEFAULT_DISPOSABLE_IP`].
    pub fn known_ips<I: IntoIterator<Item = IpAddr>>(self, ips: I) -> Self {
        let seed = std::iter::once(DEFAULT_DISPOSABLE_IP).chain(ips);
        self.ip_set(Arc::new(DisposableIpSet::new(seed)))
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// `enabled` is overridden by [`EnabledChecks::use_reachability_probe`].
    pub fn probe_options(mut self, options: ProbeOptions) -> Self {
        self.probe = options;
        self
    }

    pub fn build(self) -> crate::Result<VerificationEngine> {
        let checks = self.checks;
        let resolver: Arc<dyn MailResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(SystemResolver::from_system_conf(
                self.dns_timeout,
                DEFAULT_DNS_ATTEMPTS,
            )?),
        };
        let dns = MailDns::new(resolver, self.dns_timeout);

        let options = ClassifierOptions {
            use_static_list: checks.use_static_list,
            use_remote_api: checks.use_remote_api,
            use_ip_gating: checks.use_ip_gating,
            failure_policy: self.failure_policy,
            store_timeout: self.store_timeout,
        };
        let mut classifier = DisposableClassifier::new(
            self.cache.unwrap_or_default(),
            self.ip_set.unwrap_or_default(),
            self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            options,
        );
        if checks.use_static_list {
            let denylist = self
                .denylist
                .unwrap_or_else(|| Arc::new(StaticDenylist::embedded()));
            classifier = classifier.with_denylist(denylist);
        }
        if let Some(remote) = self.remote {
            classifier = classifier.with_remote(remote);
        }

        let probe = ProbeOptions {
            enabled: checks.use_reachability_probe,
            ..self.probe
        };
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(TcpConnector));
        let prober = MailServerProber::new(dns.clone(), connector, probe);

        Ok(VerificationEngine {
            dns,
            classifier,
            prober,
            checks,
        })
    }
}
