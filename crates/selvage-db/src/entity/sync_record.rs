//! pattern sync registry entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use selvage_types::SyncRecord;

/// sync record database model. append-only; rows are pruned by the
/// maintenance sweep once they pass the retention window.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub license_key: String,
    pub timestamp: DateTime<Utc>,
    pub pattern_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SyncRecord {
    fn from(model: Model) -> Self {
        SyncRecord {
            id: model.id as u64,
            license_key: model.license_key,
            timestamp: model.timestamp,
            pattern_count: model.pattern_count.max(0) as u32,
        }
    }
}

impl From<&SyncRecord> for ActiveModel {
    fn from(record: &SyncRecord) -> Self {
        ActiveModel {
            id: if record.id == 0 {
                NotSet
            } else {
                Set(record.id as i64)
            },
            license_key: Set(record.license_key.clone()),
            timestamp: Set(record.timestamp),
            pattern_count: Set(record.pattern_count as i32),
        }
    }
}
