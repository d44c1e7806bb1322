//! object store errors.

use thiserror::Error;

/// errors returned by object store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// object key contains an empty, traversing, or otherwise unusable segment
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// underlying filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// sidecar metadata could not be serialized
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}
