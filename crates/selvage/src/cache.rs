//! in-process license validation cache.
//!
//! cache-aside in front of the license store: validation checks here first
//! and falls back to the store on a miss, repopulating on the way out. a hit
//! is trusted without re-checking the store, so a revoked or expired license
//! can keep validating until its entry ages out. the ttl bounds that
//! staleness window and is deliberately visible configuration, not a hidden
//! constant.
//!
//! absence of an entry never means the license is invalid, only that the
//! store must be asked.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use selvage_types::Tier;
use tracing::{debug, info};

/// what a successful validation establishes about a license key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseStanding {
    /// tier granted by the license
    pub tier: Tier,
    /// account the license belongs to
    pub owner_id: String,
}

struct CacheEntry {
    standing: LicenseStanding,
    cached_at: Instant,
}

struct CacheInner {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

/// shared validation cache keyed by license key.
///
/// all clones share the same entries. entries expire lazily on read and
/// are swept by [`purge_expired`](LicenseCache::purge_expired).
#[derive(Clone)]
pub struct LicenseCache {
    inner: Arc<CacheInner>,
}

impl LicenseCache {
    /// create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                ttl,
            }),
        }
    }

    /// look up a key. a fresh entry is returned as-is; a stale one is
    /// dropped and reported as a miss.
    pub fn get(&self, key: &str) -> Option<LicenseStanding> {
        {
            let entries = self
                .inner
                .entries
                .read()
                .expect("license cache lock poisoned");
            match entries.get(key) {
                Some(entry) if entry.cached_at.elapsed() < self.inner.ttl => {
                    return Some(entry.standing.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // stale entry: evict outside the read lock
        let mut entries = self
            .inner
            .entries
            .write()
            .expect("license cache lock poisoned");
        entries.remove(key);
        None
    }

    /// record what the store said about `key`.
    pub fn insert(&self, key: &str, standing: LicenseStanding) {
        let mut entries = self
            .inner
            .entries
            .write()
            .expect("license cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                standing,
                cached_at: Instant::now(),
            },
        );
    }

    /// number of entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .expect("license cache lock poisoned")
            .len()
    }

    /// true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// drop every entry past its ttl. returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self
            .inner
            .entries
            .write()
            .expect("license cache lock poisoned");
        let before = entries.len();
        let ttl = self.inner.ttl;
        entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);
        before - entries.len()
    }

    /// spawn the background purge task.
    ///
    /// runs [`purge_expired`](LicenseCache::purge_expired) every `interval`
    /// and continues until the returned handle is dropped.
    pub fn spawn_purger(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                ttl_secs = self.inner.ttl.as_secs(),
                interval_secs = interval.as_secs(),
                "starting license cache purger"
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    debug!(purged, "purged expired license cache entries");
                }
            }
        })
    }
}
