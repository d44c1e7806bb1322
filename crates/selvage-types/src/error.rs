//! error types for selvage-types.

use thiserror::Error;

/// errors from parsing wire-format strings into domain types.
#[derive(Debug, Error)]
pub enum Error {
    /// tier string is not one of the known tiers
    #[error("unknown tier: {0}")]
    UnknownTier(String),

    /// license status string is not one of the known statuses
    #[error("unknown license status: {0}")]
    UnknownStatus(String),
}
