//! create licenses table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Licenses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Licenses::Key).string().not_null())
                    .col(
                        ColumnDef::new(Licenses::Tier)
                            .string()
                            .not_null()
                            .default("free"),
                    )
                    .col(ColumnDef::new(Licenses::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Licenses::Status)
                            .string()
                            .not_null()
                            .default("inactive"),
                    )
                    .col(ColumnDef::new(Licenses::ActivatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Licenses::ValidUntil).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Licenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // keys are the lookup handle on every validate/activate call
        manager
            .create_index(
                Index::create()
                    .name("idx_licenses_key")
                    .table(Licenses::Table)
                    .col(Licenses::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // the maintenance sweep scans for active licenses past valid_until
        manager
            .create_index(
                Index::create()
                    .name("idx_licenses_status_valid_until")
                    .table(Licenses::Table)
                    .col(Licenses::Status)
                    .col(Licenses::ValidUntil)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Licenses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Licenses {
    Table,
    Id,
    Key,
    Tier,
    OwnerId,
    Status,
    ActivatedAt,
    ValidUntil,
    CreatedAt,
}
