//! core types for selvage - a self-hosted model distribution and pattern sync backend.
//!
//! this crate provides the fundamental data structures used throughout selvage:
//! - [`tier`]: the totally ordered license tier gating catalog visibility
//! - [`license`]: license lifecycle records and key generation
//! - [`model`]: versioned catalog entries and version comparison
//! - [`record`]: sync registry rows, usage events and reviews
//! - [`config`]: application configuration

#![warn(missing_docs)]

mod config;
mod error;
mod license;
mod model;
mod record;
mod tier;
mod version;

pub use config::{CacheConfig, Config, DatabaseConfig, StorageConfig, SweepConfig};
pub use error::Error;
pub use license::{License, LicenseStatus};
pub use model::{Model, sort_catalog};
pub use record::{Review, SyncRecord, UsageEvent};
pub use tier::Tier;
pub use version::ModelVersion;

/// result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
