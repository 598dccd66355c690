use thiserror::Error;

use super::LookupFailure;

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("invalid name server address '{0}'")]
    NameServer(String),
    #[error("{record} lookup for {name} failed: {failure}")]
    Lookup {
        record: &'static str,
        name: String,
        failure: LookupFailure,
    },
}

impl DnsError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(record: &'static str, name: &str, failure: LookupFailure) -> Self {
        Self::Lookup {
            record,
            name: name.to_string(),
            failure,
        }
    }

    /// Classification of a lookup error, if this is one.
    pub fn failure(&self) -> Option<&LookupFailure> {
        match self {
            Self::Lookup { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
