//! license lifecycle records and key generation.
//!
//! licenses are created inactive (reviewer grants create directly active),
//! flipped to active exactly once by activation, and flipped to expired by
//! the maintenance sweep once `valid_until` has passed. rows are never
//! hard-deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tier::Tier;

/// length of the random portion of generated license keys (20 bytes = 40 hex chars).
pub const LICENSE_KEY_RAND_BYTES: usize = 20;

/// prefix for operator-generated license keys.
pub const LICENSE_KEY_PREFIX: &str = "slv-";

/// lifecycle status of a license. exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// issued but not yet activated
    Inactive,
    /// activated and usable
    Active,
    /// past `valid_until`; flipped by the maintenance sweep
    Expired,
}

impl LicenseStatus {
    /// the wire/storage string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Inactive => "inactive",
            LicenseStatus::Active => "active",
            LicenseStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(LicenseStatus::Inactive),
            "active" => Ok(LicenseStatus::Active),
            "expired" => Ok(LicenseStatus::Expired),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

/// a license record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    /// unique identifier
    pub id: u64,

    /// the license key presented by callers. unique.
    pub key: String,

    /// tier this license grants
    pub tier: Tier,

    /// account the license belongs to
    pub owner_id: String,

    /// current lifecycle status
    pub status: LicenseStatus,

    /// when the license was activated. stamped on the inactive -> active
    /// transition (or at creation for licenses born active).
    pub activated_at: Option<DateTime<Utc>>,

    /// when the license stops being valid. `None` means it never expires.
    pub valid_until: Option<DateTime<Utc>>,

    /// when this license was created
    pub created_at: DateTime<Utc>,
}

impl License {
    /// create a new inactive license.
    pub fn new(key: String, tier: Tier, owner_id: String) -> Self {
        Self {
            id: 0,
            key,
            tier,
            owner_id,
            status: LicenseStatus::Inactive,
            activated_at: None,
            valid_until: None,
            created_at: Utc::now(),
        }
    }

    /// create an active reviewer license for a verified review.
    ///
    /// the key has the form `REVIEWER-{PLATFORM}-{millis}`; reviewer
    /// licenses never expire.
    pub fn reviewer(platform: &str, username: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            key: Self::reviewer_key(platform, at),
            tier: Tier::FreeReviewer,
            owner_id: username.to_string(),
            status: LicenseStatus::Active,
            activated_at: Some(at),
            valid_until: None,
            created_at: at,
        }
    }

    /// generate a random operator license key (`slv-` + 40 hex chars).
    pub fn generate_key() -> String {
        use rand::Rng;
        let mut rng = rand::rng();
        let bytes: [u8; LICENSE_KEY_RAND_BYTES] = rng.random();
        format!("{}{}", LICENSE_KEY_PREFIX, hex::encode(bytes))
    }

    /// build a reviewer license key for the given platform and instant.
    pub fn reviewer_key(platform: &str, at: DateTime<Utc>) -> String {
        format!(
            "REVIEWER-{}-{}",
            platform.to_uppercase(),
            at.timestamp_millis()
        )
    }

    /// check whether `valid_until` has passed.
    pub fn is_expired(&self) -> bool {
        match &self.valid_until {
            None => false,
            Some(until) => Utc::now() > *until,
        }
    }

    /// check whether this license is currently active.
    pub fn is_active(&self) -> bool {
        self.status == LicenseStatus::Active
    }
}
