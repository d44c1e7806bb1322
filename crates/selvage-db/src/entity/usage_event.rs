//! usage event entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use selvage_types::UsageEvent;

/// usage event database model. append-only bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub license_key: String,
    pub action: String,
    pub model_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UsageEvent {
    fn from(model: Model) -> Self {
        UsageEvent {
            id: model.id as u64,
            license_key: model.license_key,
            action: model.action,
            model_id: model.model_id,
            created_at: model.created_at,
        }
    }
}

impl From<&UsageEvent> for ActiveModel {
    fn from(event: &UsageEvent) -> Self {
        ActiveModel {
            id: if event.id == 0 {
                NotSet
            } else {
                Set(event.id as i64)
            },
            license_key: Set(event.license_key.clone()),
            action: Set(event.action.clone()),
            model_id: Set(event.model_id.clone()),
            created_at: Set(event.created_at),
        }
    }
}
