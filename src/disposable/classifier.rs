use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::validator::domain_of;

use super::{
    ClassificationSource, ClassifierOptions, DisposableCache, DisposableIpSet, DomainStore,
    FailurePolicy, InsertOutcome, RemoteClassifier, StaticDenylist, StoreError,
};

/// Layered disposable-address check: cache, store, static list, remote API,
/// then known source IPs. The first positive layer wins; failing layers are
/// logged and count as "found nothing".
pub struct DisposableClassifier {
    cache: Arc<DisposableCache>,
    ip_set: Arc<DisposableIpSet>,
    store: Arc<dyn DomainStore>,
    denylist: Option<Arc<StaticDenylist>>,
    remote: Option<Arc<dyn RemoteClassifier>>,
    options: ClassifierOptions,
}

impl DisposableClassifier {
    pub fn new(
        cache: Arc<DisposableCache>,
        ip_set: Arc<DisposableIpSet>,
        store: Arc<dyn DomainStore>,
        options: ClassifierOptions,
    ) -> Self {
        Self {
            cache,
            ip_set,
            store,
            denylist: None,
            remote: None,
            options,
        }
    }

    pub fn with_denylist(mut self, denylist: Arc<StaticDenylist>) -> Self {
        self.denylist = Some(denylist);
        self
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteClassifier>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn cache(&self) -> &DisposableCache {
        &self.cache
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// `true` when the address is considered disposable.
    pub async fn classify(&self, email: &str, resolved_ip: Option<IpAddr>) -> bool {
        self.classify_with_source(email, resolved_ip).await.is_some()
    }

    /// Like [`classify`](Self::classify) but names the layer that decided.
    pub async fn classify_with_source(
        &self,
        email: &str,
        resolved_ip: Option<IpAddr>,
    ) -> Option<ClassificationSource> {
        let domain = domain_of(email)?;
        let mut layer_failed = false;
        let mut remote_answered = false;

        if self.cache.contains(&domain) {
            debug!(domain = %domain, "disposable domain cache hit");
            return Some(ClassificationSource::Cache);
        }

        match self.with_store_timeout(self.store.find_domain(&domain)).await {
            Ok(Some(_)) => {
                self.cache.insert(&domain);
                return Some(ClassificationSource::Store);
            }
            Ok(None) => {}
            Err(err) => {
                error!(domain = %domain, error = %err, "disposable store lookup failed");
                layer_failed = true;
            }
        }

        if self.options.use_static_list {
            if let Some(list) = &self.denylist {
                if list.contains(&domain) {
                    self.remember(&domain, ClassificationSource::StaticList).await;
                    return Some(ClassificationSource::StaticList);
                }
            }
        }

        if self.options.use_remote_api {
            if let Some(remote) = &self.remote {
                match remote.is_disposable(email).await {
                    Ok(true) => {
                        self.remember(&domain, ClassificationSource::Remote).await;
                        return Some(ClassificationSource::Remote);
                    }
                    Ok(false) => remote_answered = true,
                    Err(err) => {
                        error!(email, error = %err, "failed to validate email with classification API");
                        layer_failed = true;
                    }
                }
            }
        }

        if self.options.use_ip_gating {
            if let Some(ip) = resolved_ip {
                if self.ip_set.contains(&ip) {
                    debug!(domain = %domain, %ip, "mail host address is a known disposable IP");
                    return Some(ClassificationSource::IpAddress);
                }
            }
        }

        // A definite remote "no" is a verdict, not an unknown.
        if layer_failed
            && !remote_answered
            && self.options.failure_policy == FailurePolicy::FailClosed
        {
            warn!(domain = %domain, "classification incomplete, treating as disposable");
            return Some(ClassificationSource::FailClosed);
        }

        None
    }

    /// Caches the domain and persists it. A failed write is logged and ignored.
    async fn remember(&self, domain: &str, source: ClassificationSource) {
        self.cache.insert(domain);
        match self
            .with_store_timeout(self.store.insert_domain(domain, source))
            .await
        {
            Ok(InsertOutcome::Inserted) => debug!(domain, %source, "disposable domain stored"),
            Ok(InsertOutcome::AlreadyExists) => {
                debug!(domain, "disposable domain already stored")
            }
            Err(err) => warn!(domain, error = %err, "failed to persist disposable domain"),
        }
    }

    async fn with_store_timeout<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.options.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }
}
