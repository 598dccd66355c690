use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};

pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Known disposable mail host every IP set starts with.
pub const DEFAULT_DISPOSABLE_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(167, 172, 13, 163));

/// Bounded set of domains known to be disposable, least-recently-used eviction.
/// Shared between concurrent verifications; inserting a domain twice is a no-op.
pub struct DisposableCache {
    entries: Mutex<LruCache<String, ()>>,
}

impl DisposableCache {
    /// A zero capacity falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Hit refreshes the entry's recency.
    pub fn contains(&self, domain: &str) -> bool {
        self.entries.lock().get(domain).is_some()
    }

    pub fn insert(&self, domain: &str) {
        self.entries.lock().put(domain.to_string(), ());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for DisposableCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Append-only set of source IPs known to serve disposable mail.
pub struct DisposableIpSet {
    addrs: RwLock<HashSet<IpAddr>>,
}

impl DisposableIpSet {
    pub fn new<I>(seed: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        Self {
            addrs: RwLock::new(seed.into_iter().collect()),
        }
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.addrs.read().contains(ip)
    }

    pub fn insert(&self, ip: IpAddr) {
        self.addrs.write().insert(ip);
    }

    pub fn len(&self) -> usize {
        self.addrs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Seeded with [`DEFAULT_DISPOSABLE_IP`].
impl Default for DisposableIpSet {
    fn default() -> Self {
        Self::new([DEFAULT_DISPOSABLE_IP])
    }
}
