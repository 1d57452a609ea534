use thiserror::Error;

/// Failures reported by a [`crate::ContentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be reached at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The storage layer rejected a write for size reasons
    #[error("Store quota exceeded writing {key} ({len} bytes)")]
    QuotaExceeded { key: String, len: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures fetching a document body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Unexpected status {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid content path: {0}")]
    InvalidPath(String),
}
