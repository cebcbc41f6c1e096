use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};

/// Status written by the disposal workflow.
pub const STATUS_DISPOSED: &str = "Disposed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub asset_type: String,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub location_id: i32,
    pub sublocation_id: i32,
    pub status: String,
    pub assigned_to: Option<String>,
    /// Annual depreciation amount
    #[sea_orm(column_type = "Double")]
    pub depreciation: f64,
    pub purchased_on: NaiveDate,
    #[sea_orm(column_type = "Double", nullable)]
    pub purchase_price: Option<f64>,
    /// `{location}-{category}-{sublocation}-{sequence}`
    #[sea_orm(unique)]
    pub serial_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_disposed(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_DISPOSED)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    #[sea_orm(
        belongs_to = "super::sub_location::Entity",
        from = "Column::SublocationId",
        to = "super::sub_location::Column::Id"
    )]
    SubLocation,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::sub_category::Entity",
        from = "Column::SubcategoryId",
        to = "super::sub_category::Column::Id"
    )]
    SubCategory,
    #[sea_orm(has_many = "super::asset_movement::Entity")]
    Movements,
    #[sea_orm(has_many = "super::maintenance::Entity")]
    Maintenance,
    #[sea_orm(has_many = "super::disposal::Entity")]
    Disposals,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::asset_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl Related<super::maintenance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maintenance.def()
    }
}

impl Related<super::disposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disposals.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}
