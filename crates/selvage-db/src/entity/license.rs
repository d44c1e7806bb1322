//! license entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use selvage_types::{License, LicenseStatus, Tier};

/// license database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub key: String,
    pub tier: String,
    pub owner_id: String,
    pub status: String,
    pub activated_at: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for License {
    fn from(model: Model) -> Self {
        License {
            id: model.id as u64,
            key: model.key,
            // unknown tier strings fall back to the least privilege
            tier: Tier::parse_lenient(&model.tier),
            owner_id: model.owner_id,
            status: model
                .status
                .parse()
                .unwrap_or(LicenseStatus::Inactive),
            activated_at: model.activated_at,
            valid_until: model.valid_until,
            created_at: model.created_at,
        }
    }
}

impl From<&License> for ActiveModel {
    fn from(license: &License) -> Self {
        ActiveModel {
            id: if license.id == 0 {
                NotSet
            } else {
                Set(license.id as i64)
            },
            key: Set(license.key.clone()),
            tier: Set(license.tier.as_str().to_string()),
            owner_id: Set(license.owner_id.clone()),
            status: Set(license.status.as_str().to_string()),
            activated_at: Set(license.activated_at),
            valid_until: Set(license.valid_until),
            created_at: Set(license.created_at),
        }
    }
}
