//! error types for the database layer.

use thiserror::Error;

/// errors from database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// failed to connect to the database
    #[error("database connection error: {0}")]
    Connection(String),

    /// failed to run migrations
    #[error("migration error: {0}")]
    Migration(String),

    /// a query failed
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// stored data could not be interpreted
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// json (de)serialization of a column failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
