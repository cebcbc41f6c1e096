use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A site such as a building or campus. `code` is the first serial-number segment.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sub_location::Entity")]
    SubLocations,
    #[sea_orm(has_many = "super::asset::Entity")]
    Assets,
}

impl Related<super::sub_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubLocations.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
