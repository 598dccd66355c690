//! TOML configuration for the verification engine and the HTTP front.
//!
//! Every section and key is optional; a missing file means all defaults.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::disposable::{
    ClassifierOptions, DEFAULT_CACHE_CAPACITY, DEFAULT_DISPOSABLE_IP, DEFAULT_ENDPOINT,
    FailurePolicy,
};
use crate::engine::EnabledChecks;
use crate::smtp_verify::ProbeOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dns: DnsConfig,
    pub disposable: DisposableConfig,
    pub smtp: SmtpConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DnsConfig {
    /// Upper bound for one adapter call, in milliseconds.
    pub timeout_ms: u64,
    pub attempts: usize,
    /// Name-server IPs; empty means the system configuration.
    pub name_servers: Vec<String>,
    /// Resolve and report the mail host's IPv4 address.
    pub resolve_ip_address: bool,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            attempts: 2,
            name_servers: Vec::new(),
            resolve_ip_address: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisposableConfig {
    pub cache_capacity: usize,
    pub use_static_list: bool,
    /// Replaces the embedded list when set.
    pub static_list_path: Option<PathBuf>,
    pub use_remote_api: bool,
    pub remote_endpoint: String,
    pub remote_timeout_ms: u64,
    pub use_ip_gating: bool,
    pub known_ips: Vec<String>,
    /// JSON document holding classified domains; in-memory only when unset.
    pub store_path: Option<PathBuf>,
    pub store_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for DisposableConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            use_static_list: true,
            static_list_path: None,
            use_remote_api: true,
            remote_endpoint: DEFAULT_ENDPOINT.to_string(),
            remote_timeout_ms: 5000,
            use_ip_gating: true,
            known_ips: vec![DEFAULT_DISPOSABLE_IP.to_string()],
            store_path: None,
            store_timeout_ms: 2000,
            failure_policy: FailurePolicy::FailOpen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub helo_domain: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        let probe = ProbeOptions::default();
        Self {
            enabled: probe.enabled,
            port: probe.port,
            connect_timeout_ms: probe.connect_timeout.as_millis() as u64,
            command_timeout_ms: probe.command_timeout.as_millis() as u64,
            helo_domain: probe.helo_domain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Reads and validates `path`. A path that does not exist yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.disposable;
        if d.use_remote_api && d.remote_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "disposable.remote_endpoint is empty while the remote API is enabled".into(),
            ));
        }
        if d.cache_capacity == 0 {
            return Err(ConfigError::Invalid("disposable.cache_capacity must be > 0".into()));
        }
        let timeouts = [
            ("dns.timeout_ms", self.dns.timeout_ms),
            ("disposable.remote_timeout_ms", d.remote_timeout_ms),
            ("disposable.store_timeout_ms", d.store_timeout_ms),
            ("smtp.connect_timeout_ms", self.smtp.connect_timeout_ms),
            ("smtp.command_timeout_ms", self.smtp.command_timeout_ms),
        ];
        if let Some((key, _)) = timeouts.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid(format!("{key} must be > 0")));
        }
        if self.dns.attempts == 0 {
            return Err(ConfigError::Invalid("dns.attempts must be > 0".into()));
        }
        self.known_ips()?;
        for server in &self.dns.name_servers {
            if server.parse::<IpAddr>().is_err() {
                return Err(ConfigError::Invalid(format!(
                    "dns.name_servers: '{server}' is not an IP address"
                )));
            }
        }
        Ok(())
    }

    pub fn known_ips(&self) -> Result<Vec<IpAddr>, ConfigError> {
        self.disposable
            .known_ips
            .iter()
            .map(|raw| {
                raw.trim().parse::<IpAddr>().map_err(|_| {
                    ConfigError::Invalid(format!("disposable.known_ips: '{raw}' is not an IP address"))
                })
            })
            .collect()
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns.timeout_ms)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.disposable.remote_timeout_ms)
    }

    pub fn enabled_checks(&self) -> EnabledChecks {
        EnabledChecks {
            use_static_list: self.disposable.use_static_list,
            use_remote_api: self.disposable.use_remote_api,
            use_reachability_probe: self.smtp.enabled,
            use_ip_gating: self.disposable.use_ip_gating,
            resolve_ip_address: self.dns.resolve_ip_address,
        }
    }

    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            use_static_list: self.disposable.use_static_list,
            use_remote_api: self.disposable.use_remote_api,
            use_ip_gating: self.disposable.use_ip_gating,
            failure_policy: self.disposable.failure_policy,
            store_timeout: Duration::from_millis(self.disposable.store_timeout_ms),
        }
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            enabled: self.smtp.enabled,
            port: self.smtp.port,
            connect_timeout: Duration::from_millis(self.smtp.connect_timeout_ms),
            command_timeout: Duration::from_millis(self.smtp.command_timeout_ms),
            helo_domain: self.smtp.helo_domain.clone(),
        }
    }
}
