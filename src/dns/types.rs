use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MxStatus {
    Records(Vec<MxRecord>),
    NoRecords,
}

impl MxStatus {
    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoRecords => &[],
        }
    }
}

/// Why a lookup produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The name exists but has no record of the requested type.
    NoData,
    /// The name does not exist.
    NxDomain,
    Timeout,
    Transient(String),
}

impl LookupFailure {
    /// NoData and NxDomain are answers, not infrastructure problems.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::NoData | Self::NxDomain)
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data"),
            Self::NxDomain => f.write_str("domain does not exist"),
            Self::Timeout => f.write_str("timed out"),
            Self::Transient(reason) => write!(f, "transient failure ({reason})"),
        }
    }
}
