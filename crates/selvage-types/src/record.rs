//! append-only bookkeeping records: sync registry rows, usage events, reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// usage event action recorded for model downloads.
pub const ACTION_MODEL_DOWNLOAD: &str = "model_download";

/// one row in the append-only pattern sync registry.
///
/// `timestamp` is the batch instant; its millisecond value is also the
/// final path segment of the archived batch in object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    /// unique identifier
    pub id: u64,

    /// license key the batch was synced under
    pub license_key: String,

    /// when the batch was accepted
    pub timestamp: DateTime<Utc>,

    /// number of patterns in the batch
    pub pattern_count: u32,
}

impl SyncRecord {
    /// create a new sync record.
    pub fn new(license_key: String, timestamp: DateTime<Utc>, pattern_count: u32) -> Self {
        Self {
            id: 0,
            license_key,
            timestamp,
            pattern_count,
        }
    }

    /// the object-storage path the batch was archived at.
    pub fn archive_path(&self) -> String {
        format!(
            "patterns/{}/{}",
            self.license_key,
            self.timestamp.timestamp_millis()
        )
    }
}

/// fire-and-forget usage bookkeeping, written on successful downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    /// unique identifier
    pub id: u64,

    /// license key that performed the action
    pub license_key: String,

    /// action name, e.g. [`ACTION_MODEL_DOWNLOAD`]
    pub action: String,

    /// model the action applied to
    pub model_id: String,

    /// when the action happened
    pub created_at: DateTime<Utc>,
}

impl UsageEvent {
    /// create a model-download usage event.
    pub fn model_download(license_key: String, model_id: String) -> Self {
        Self {
            id: 0,
            license_key,
            action: ACTION_MODEL_DOWNLOAD.to_string(),
            model_id,
            created_at: Utc::now(),
        }
    }
}

/// an externally-verified product review.
///
/// a verified (platform, username) pair entitles the reviewer to a
/// free-reviewer license on each verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// unique identifier
    pub id: u64,

    /// review platform, e.g. "amazon"
    pub platform: String,

    /// reviewer account name on the platform
    pub username: String,

    /// whether the review passed verification
    pub verified: bool,

    /// when this row was created
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// create a review row.
    pub fn new(platform: String, username: String, verified: bool) -> Self {
        Self {
            id: 0,
            platform,
            username,
            verified,
            created_at: Utc::now(),
        }
    }
}
