use thiserror::Error;

use super::ProbeStage;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("address has no domain")]
    MissingDomain,
    #[error("no mail exchanger published for {domain}")]
    NoMailExchanger { domain: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} timed out")]
    Timeout { stage: ProbeStage },
    #[error("I/O error during {stage}: {source}")]
    Io {
        stage: ProbeStage,
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{stage} rejected with {code}")]
    Rejected { stage: ProbeStage, code: u16 },
}

impl ProbeError {
    pub(crate) fn io(stage: ProbeStage, source: std::io::Error) -> Self {
        Self::Io { stage, source }
    }
}
