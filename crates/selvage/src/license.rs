//! license validation and activation on top of the store and cache.

use chrono::{DateTime, Utc};
use selvage_db::{Database, SelvageDb};
use selvage_types::License;
use tracing::debug;

use crate::cache::{LicenseCache, LicenseStanding};

/// license operations shared by the http handlers and the cli.
///
/// wraps the authoritative store with the cache-aside read path. the cache
/// is optional; without one every validation goes straight to the store.
#[derive(Clone)]
pub struct LicenseService {
    db: SelvageDb,
    cache: Option<LicenseCache>,
}

impl LicenseService {
    /// create a service over `db`, fronted by `cache` if given.
    pub fn new(db: SelvageDb, cache: Option<LicenseCache>) -> Self {
        Self { db, cache }
    }

    /// resolve a key to its standing if the license is active.
    ///
    /// a cache hit is trusted without consulting the store; a miss falls
    /// back to the store and repopulates the cache. `None` means the key is
    /// unknown or not active.
    pub async fn validate(&self, key: &str) -> Result<Option<LicenseStanding>, selvage_db::Error> {
        if let Some(cache) = &self.cache {
            if let Some(standing) = cache.get(key) {
                debug!(key, "license validated from cache");
                return Ok(Some(standing));
            }
        }

        let Some(license) = self.db.get_active_license(key).await? else {
            return Ok(None);
        };

        let standing = LicenseStanding {
            tier: license.tier,
            owner_id: license.owner_id,
        };
        if let Some(cache) = &self.cache {
            cache.insert(key, standing.clone());
        }
        Ok(Some(standing))
    }

    /// activate an inactive license.
    ///
    /// on success the cache is seeded so a validation immediately after
    /// activation answers consistently. `None` means the key is unknown or
    /// not inactive.
    pub async fn activate(
        &self,
        key: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<License>, selvage_db::Error> {
        let Some(license) = self.db.activate_license(key, at).await? else {
            return Ok(None);
        };

        if let Some(cache) = &self.cache {
            cache.insert(
                key,
                LicenseStanding {
                    tier: license.tier,
                    owner_id: license.owner_id.clone(),
                },
            );
        }
        Ok(Some(license))
    }

    /// mint an active free-reviewer license for a verified reviewer.
    ///
    /// repeated calls for the same reviewer mint a fresh license each time;
    /// the generated key embeds the call's millisecond timestamp.
    pub async fn mint_reviewer(
        &self,
        platform: &str,
        username: &str,
    ) -> Result<License, selvage_db::Error> {
        let license = License::reviewer(platform, username, Utc::now());
        let created = self.db.create_license(&license).await?;

        if let Some(cache) = &self.cache {
            cache.insert(
                &created.key,
                LicenseStanding {
                    tier: created.tier,
                    owner_id: created.owner_id.clone(),
                },
            );
        }
        Ok(created)
    }
}
