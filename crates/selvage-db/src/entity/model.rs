//! catalog model entity for database storage.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use selvage_types::{ModelVersion, Tier};

/// catalog model database model.
///
/// `id` is the natural key (also the blob store key suffix), so there is
/// no auto-increment primary key here.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub version: String,
    pub tier: String,
    pub description: String,
    pub size: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for selvage_types::Model {
    fn from(model: Model) -> Self {
        selvage_types::Model {
            id: model.id,
            name: model.name,
            version: ModelVersion::from(model.version),
            tier: Tier::parse_lenient(&model.tier),
            description: model.description,
            size: model.size,
        }
    }
}

impl From<&selvage_types::Model> for ActiveModel {
    fn from(model: &selvage_types::Model) -> Self {
        ActiveModel {
            id: Set(model.id.clone()),
            name: Set(model.name.clone()),
            version: Set(model.version.as_str().to_string()),
            tier: Set(model.tier.as_str().to_string()),
            description: Set(model.description.clone()),
            size: Set(model.size),
        }
    }
}
