//! configuration types for selvage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// main configuration for selvage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// address to bind the http server to.
    pub listen_addr: String,

    /// log level: trace, debug, info, warn or error.
    pub log_level: String,

    /// database configuration.
    pub database: DatabaseConfig,

    /// object storage configuration.
    pub storage: StorageConfig,

    /// license cache tuning.
    pub cache: CacheConfig,

    /// maintenance sweep tuning.
    pub sweep: SweepConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8787".to_string(),
            log_level: "info".to_string(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            sweep: SweepConfig::default(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,

    /// enable write-ahead logging (sqlite only).
    pub write_ahead_log: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/selvage/selvage.db".to_string(),
            write_ahead_log: true,
        }
    }
}

/// object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// root directory for stored objects (model blobs, pattern archives).
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/var/lib/selvage/objects"),
        }
    }
}

/// license cache tuning.
///
/// the cache is a read accelerator in front of the license store; a hit is
/// trusted without re-checking the store, so `ttl_secs` bounds how stale a
/// cached validation may be.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// how long a cached license entry is trusted (seconds).
    pub ttl_secs: u64,

    /// how often the background purger drops expired entries (seconds).
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,
            purge_interval_secs: 3_600,
        }
    }
}

/// maintenance sweep tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// how often the sweep runs (seconds).
    pub interval_secs: u64,

    /// sync registry rows older than this many days are pruned.
    pub retention_days: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3_600,
            retention_days: 30,
        }
    }
}
