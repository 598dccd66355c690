use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store document is corrupt: {source}")]
    Corrupt {
        #[source]
        source: serde_json::Error,
    },
    #[error("store call timed out")]
    Timeout,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP client initialization failed: {source}")]
    ClientInit {
        #[source]
        source: reqwest::Error,
    },
    #[error("request to classification API failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("classification API answered with status {status}")]
    Status { status: u16 },
    #[error("classification API response is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum DenylistError {
    #[error("cannot read static list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("static list {0} contains no domains")]
    Empty(String),
}
