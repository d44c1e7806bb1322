//! scheduled maintenance sweep.
//!
//! two idempotent bulk operations against the store: flip active licenses
//! past their `valid_until` to expired, and delete sync registry rows older
//! than the retention window. the validation cache is left alone; entries
//! for newly-expired licenses age out by ttl.

use std::time::Duration;

use chrono::Utc;
use selvage_db::{Database, SelvageDb};
use tracing::{debug, info, warn};

/// what one sweep cycle changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// licenses flipped from active to expired
    pub expired_licenses: u64,
    /// sync records deleted
    pub pruned_records: u64,
}

/// periodic license expiry and sync registry pruning.
#[derive(Clone)]
pub struct MaintenanceSweep {
    db: SelvageDb,
    retention: chrono::Duration,
}

impl MaintenanceSweep {
    /// create a sweep that keeps sync records for `retention_days`.
    pub fn new(db: SelvageDb, retention_days: u32) -> Self {
        Self {
            db,
            retention: chrono::Duration::days(i64::from(retention_days)),
        }
    }

    /// run one sweep cycle. safe to run back to back; a second run over
    /// unchanged state changes nothing.
    pub async fn run_once(&self) -> Result<SweepOutcome, selvage_db::Error> {
        let now = Utc::now();

        let expired_licenses = self.db.expire_due_licenses(now).await?;
        let pruned_records = self.db.prune_sync_records(now - self.retention).await?;

        let outcome = SweepOutcome {
            expired_licenses,
            pruned_records,
        };
        if expired_licenses > 0 || pruned_records > 0 {
            info!(
                expired = expired_licenses,
                pruned = pruned_records,
                "maintenance sweep applied changes"
            );
        } else {
            debug!("maintenance sweep found nothing to do");
        }
        Ok(outcome)
    }

    /// spawn the background sweep task.
    ///
    /// runs a cycle every `interval` and continues until the returned
    /// handle is dropped.
    pub fn spawn(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = interval.as_secs(),
                retention_days = self.retention.num_days(),
                "starting maintenance sweep"
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    warn!(error = %e, "maintenance sweep cycle failed");
                }
            }
        })
    }
}
