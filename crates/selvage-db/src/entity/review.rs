//! review entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use selvage_types::Review;

/// review database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub platform: String,
    pub username: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Review {
    fn from(model: Model) -> Self {
        Review {
            id: model.id as u64,
            platform: model.platform,
            username: model.username,
            verified: model.verified,
            created_at: model.created_at,
        }
    }
}

impl From<&Review> for ActiveModel {
    fn from(review: &Review) -> Self {
        ActiveModel {
            id: if review.id == 0 {
                NotSet
            } else {
                Set(review.id as i64)
            },
            platform: Set(review.platform.clone()),
            username: Set(review.username.clone()),
            verified: Set(review.verified),
            created_at: Set(review.created_at),
        }
    }
}
