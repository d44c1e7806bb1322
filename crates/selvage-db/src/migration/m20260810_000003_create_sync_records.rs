//! create sync_records table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncRecords::LicenseKey).string().not_null())
                    .col(
                        ColumnDef::new(SyncRecords::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncRecords::PatternCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_records_license_key")
                    .table(SyncRecords::Table)
                    .col(SyncRecords::LicenseKey)
                    .to_owned(),
            )
            .await?;

        // the maintenance sweep prunes by age
        manager
            .create_index(
                Index::create()
                    .name("idx_sync_records_timestamp")
                    .table(SyncRecords::Table)
                    .col(SyncRecords::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SyncRecords {
    Table,
    Id,
    LicenseKey,
    Timestamp,
    PatternCount,
}
