//! database layer for selvage.
//!
//! this crate provides persistent storage for:
//! - Licenses
//! - Catalog models
//! - Pattern sync records
//! - Usage events
//! - Reviews
//!
//! the license table is authoritative for authorization; rows are never
//! hard-deleted, their lifecycle lives in the `status` column.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use sea_orm_migration::MigratorTrait;

use selvage_types::{Config, License, LicenseStatus, Model, Review, SyncRecord, UsageEvent};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// database trait for selvage storage operations.
///
/// this trait abstracts over different database backends (sqlite,
/// postgresql). conflicting writes to the same license row are serialized
/// by the store itself: activation is a single conditional update.
pub trait Database: Send + Sync {
    // ─── Health Check ─────────────────────────────────────────────────────────

    /// ping the database to verify connectivity.
    ///
    /// returns `ok(())` if the database is reachable, `err` otherwise.
    /// used for health checks with a recommended timeout of 1 second.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // ─── License Operations ──────────────────────────────────────────────────

    /// create a new license. returns the created license with its assigned id.
    fn create_license(&self, license: &License) -> impl Future<Output = Result<License>> + Send;

    /// get a license by key, regardless of status. returns `None` if unknown.
    fn get_license(&self, key: &str) -> impl Future<Output = Result<Option<License>>> + Send;

    /// get a license by key if and only if its status is `active`.
    fn get_active_license(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<License>>> + Send;

    /// activate an inactive license, stamping `activated_at`.
    ///
    /// the flip is one conditional update filtered on `status = 'inactive'`,
    /// so of two concurrent attempts exactly one succeeds. returns the
    /// activated license, or `None` if the key is unknown or not inactive
    /// (the two cases are indistinguishable by design).
    fn activate_license(
        &self,
        key: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<License>>> + Send;

    /// list all licenses.
    fn list_licenses(&self) -> impl Future<Output = Result<Vec<License>>> + Send;

    /// flip every active license whose `valid_until` is before `now` to
    /// expired. returns the number of rows changed. idempotent.
    fn expire_due_licenses(&self, now: DateTime<Utc>) -> impl Future<Output = Result<u64>> + Send;

    // ─── Catalog Operations ──────────────────────────────────────────────────

    /// create or update a catalog model by its natural id.
    fn upsert_model(&self, model: &Model) -> impl Future<Output = Result<Model>> + Send;

    /// get a catalog model by id.
    fn get_model(&self, id: &str) -> impl Future<Output = Result<Option<Model>>> + Send;

    /// list the whole catalog.
    fn list_models(&self) -> impl Future<Output = Result<Vec<Model>>> + Send;

    // ─── Sync Registry Operations ────────────────────────────────────────────

    /// append a row to the sync registry.
    fn create_sync_record(
        &self,
        record: &SyncRecord,
    ) -> impl Future<Output = Result<SyncRecord>> + Send;

    /// list sync records for a license key, oldest first.
    fn list_sync_records(
        &self,
        license_key: &str,
    ) -> impl Future<Output = Result<Vec<SyncRecord>>> + Send;

    /// delete sync records older than `cutoff`. returns the number of rows
    /// deleted. idempotent.
    fn prune_sync_records(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    // ─── Usage Events ────────────────────────────────────────────────────────

    /// append a usage event.
    fn record_usage(&self, event: &UsageEvent) -> impl Future<Output = Result<()>> + Send;

    /// count stored usage events.
    fn count_usage_events(&self) -> impl Future<Output = Result<u64>> + Send;

    // ─── Reviews ─────────────────────────────────────────────────────────────

    /// create a review row.
    fn create_review(&self, review: &Review) -> impl Future<Output = Result<Review>> + Send;

    /// look up a verified review by platform and username.
    fn get_verified_review(
        &self,
        platform: &str,
        username: &str,
    ) -> impl Future<Output = Result<Option<Review>>> + Send;

    /// list all review rows.
    fn list_reviews(&self) -> impl Future<Output = Result<Vec<Review>>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct SelvageDb {
    conn: DatabaseConnection,
}

impl SelvageDb {
    /// create a new database connection from config and run migrations.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::build_connection_url(&config.database)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };

        // enable WAL mode for sqlite if configured
        if config.database.db_type == "sqlite" && config.database.write_ahead_log {
            db.enable_wal_mode().await?;
        }

        db.migrate().await?;
        Ok(db)
    }

    /// enable write-ahead logging mode for sqlite.
    ///
    /// WAL mode allows concurrent reads during writes. must be called
    /// before any writes.
    async fn enable_wal_mode(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .map_err(|e| Error::Connection(format!("failed to enable WAL mode: {}", e)))?;
        tracing::info!("sqlite WAL mode enabled");
        Ok(())
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &selvage_types::DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // add ?mode=rwc to create the file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => Ok(config.connection_string.clone()),
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }
}

impl Database for SelvageDb {
    // health check

    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    // license operations

    async fn create_license(&self, license: &License) -> Result<License> {
        let model: entity::license::ActiveModel = license.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_license(&self, key: &str) -> Result<Option<License>> {
        let result = entity::license::Entity::find()
            .filter(entity::license::Column::Key.eq(key))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn get_active_license(&self, key: &str) -> Result<Option<License>> {
        let result = entity::license::Entity::find()
            .filter(entity::license::Column::Key.eq(key))
            .filter(entity::license::Column::Status.eq(LicenseStatus::Active.as_str()))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn activate_license(&self, key: &str, at: DateTime<Utc>) -> Result<Option<License>> {
        let result = entity::license::Entity::update_many()
            .col_expr(
                entity::license::Column::Status,
                Expr::value(LicenseStatus::Active.as_str()),
            )
            .col_expr(entity::license::Column::ActivatedAt, Expr::value(at))
            .filter(entity::license::Column::Key.eq(key))
            .filter(entity::license::Column::Status.eq(LicenseStatus::Inactive.as_str()))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_license(key).await
    }

    async fn list_licenses(&self) -> Result<Vec<License>> {
        let results = entity::license::Entity::find()
            .order_by_asc(entity::license::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn expire_due_licenses(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = entity::license::Entity::update_many()
            .col_expr(
                entity::license::Column::Status,
                Expr::value(LicenseStatus::Expired.as_str()),
            )
            .filter(entity::license::Column::Status.eq(LicenseStatus::Active.as_str()))
            .filter(entity::license::Column::ValidUntil.is_not_null())
            .filter(entity::license::Column::ValidUntil.lt(now))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    // catalog operations

    async fn upsert_model(&self, model: &Model) -> Result<Model> {
        let active: entity::model::ActiveModel = model.into();
        entity::model::Entity::insert(active)
            .on_conflict(
                OnConflict::column(entity::model::Column::Id)
                    .update_columns([
                        entity::model::Column::Name,
                        entity::model::Column::Version,
                        entity::model::Column::Tier,
                        entity::model::Column::Description,
                        entity::model::Column::Size,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let stored = self.get_model(&model.id).await?;
        stored.ok_or_else(|| Error::InvalidData(format!("model {} missing after upsert", model.id)))
    }

    async fn get_model(&self, id: &str) -> Result<Option<Model>> {
        let result = entity::model::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(result.map(Into::into))
    }

    async fn list_models(&self) -> Result<Vec<Model>> {
        let results = entity::model::Entity::find()
            .order_by_asc(entity::model::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    // sync registry operations

    async fn create_sync_record(&self, record: &SyncRecord) -> Result<SyncRecord> {
        let model: entity::sync_record::ActiveModel = record.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn list_sync_records(&self, license_key: &str) -> Result<Vec<SyncRecord>> {
        let results = entity::sync_record::Entity::find()
            .filter(entity::sync_record::Column::LicenseKey.eq(license_key))
            .order_by_asc(entity::sync_record::Column::Timestamp)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn prune_sync_records(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = entity::sync_record::Entity::delete_many()
            .filter(entity::sync_record::Column::Timestamp.lt(cutoff))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    // usage events

    async fn record_usage(&self, event: &UsageEvent) -> Result<()> {
        let model: entity::usage_event::ActiveModel = event.into();
        model.insert(&self.conn).await?;
        Ok(())
    }

    async fn count_usage_events(&self) -> Result<u64> {
        let count = entity::usage_event::Entity::find()
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    // reviews

    async fn create_review(&self, review: &Review) -> Result<Review> {
        let model: entity::review::ActiveModel = review.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_verified_review(&self, platform: &str, username: &str) -> Result<Option<Review>> {
        let result = entity::review::Entity::find()
            .filter(entity::review::Column::Platform.eq(platform))
            .filter(entity::review::Column::Username.eq(username))
            .filter(entity::review::Column::Verified.eq(true))
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        let results = entity::review::Entity::find()
            .order_by_asc(entity::review::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }
}
