//! database migrations for selvage.

pub use sea_orm_migration::prelude::*;

mod m20260810_000001_create_licenses;
mod m20260810_000002_create_models;
mod m20260810_000003_create_sync_records;
mod m20260810_000004_create_usage_events;
mod m20260810_000005_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_create_licenses::Migration),
            Box::new(m20260810_000002_create_models::Migration),
            Box::new(m20260810_000003_create_sync_records::Migration),
            Box::new(m20260810_000004_create_usage_events::Migration),
            Box::new(m20260810_000005_create_reviews::Migration),
        ]
    }
}
