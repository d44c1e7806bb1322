//! create usage_events table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageEvents::LicenseKey).string().not_null())
                    .col(ColumnDef::new(UsageEvents::Action).string().not_null())
                    .col(ColumnDef::new(UsageEvents::ModelId).string().not_null())
                    .col(
                        ColumnDef::new(UsageEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_usage_events_license_key")
                    .table(UsageEvents::Table)
                    .col(UsageEvents::LicenseKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UsageEvents {
    Table,
    Id,
    LicenseKey,
    Action,
    ModelId,
    CreatedAt,
}
