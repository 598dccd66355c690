use std::time::Duration;

/// Settings for [`MailServerProber`](super::MailServerProber).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Off by default: outbound port 25 is commonly blocked and probing hurts
    /// the sender's IP reputation.
    pub enabled: bool,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub helo_domain: String,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 25,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
            helo_domain: "localhost".to_string(),
        }
    }
}

impl ProbeOptions {
    /// Name sent with `EHLO`; the target domain when none is configured.
    pub fn helo_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.helo_domain.trim().is_empty() {
            fallback
        } else {
            self.helo_domain.as_str()
        }
    }
}
