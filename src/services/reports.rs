use crate::{
    db::DbPool,
    entities::{asset, disposal},
    errors::ServiceError,
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

const DAYS_PER_YEAR: f64 = 365.25;

/// Straight-line depreciation of one asset at a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepreciationLine {
    pub asset_id: i32,
    pub name: String,
    pub serial_number: String,
    pub purchased_on: NaiveDate,
    pub purchase_price: Option<f64>,
    /// Annual depreciation amount
    pub rate: f64,
    pub age_years: f64,
    pub accumulated: f64,
    /// `None` when no purchase price was recorded
    pub book_value: Option<f64>,
}

impl DepreciationLine {
    pub fn compute(asset: &asset::Model, as_of: NaiveDate) -> Self {
        let days = (as_of - asset.purchased_on).num_days().max(0);
        let age_years = days as f64 / DAYS_PER_YEAR;
        let accumulated = asset.depreciation * age_years;
        let book_value = asset
            .purchase_price
            .map(|price| (price - accumulated).max(0.0));

        Self {
            asset_id: asset.id,
            name: asset.name.clone(),
            serial_number: asset.serial_number.clone(),
            purchased_on: asset.purchased_on,
            purchase_price: asset.purchase_price,
            rate: asset.depreciation,
            age_years,
            accumulated,
            book_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DisposalLine {
    pub asset_id: i32,
    pub name: String,
    pub serial_number: String,
    /// Latest disposal record, if one exists
    pub disposal_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// Read-only reports over the asset register
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn depreciation(&self, as_of: NaiveDate) -> Result<Vec<DepreciationLine>, ServiceError> {
        let assets = asset::Entity::find()
            .order_by_asc(asset::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;

        let lines: Vec<DepreciationLine> = assets
            .iter()
            .map(|a| DepreciationLine::compute(a, as_of))
            .collect();
        info!(assets = lines.len(), %as_of, "Depreciation report generated");
        Ok(lines)
    }

    /// Every asset whose status is `Disposed`.
    #[instrument(skip(self))]
    pub async fn disposals(&self) -> Result<Vec<DisposalLine>, ServiceError> {
        let db = self.db_pool.as_ref();
        let assets = asset::Entity::find()
            .filter(asset::Column::Status.eq(asset::STATUS_DISPOSED))
            .order_by_asc(asset::Column::Id)
            .all(db)
            .await?;

        let ids: Vec<i32> = assets.iter().map(|a| a.id).collect();
        let mut latest: HashMap<i32, disposal::Model> = HashMap::new();
        if !ids.is_empty() {
            let records = disposal::Entity::find()
                .filter(disposal::Column::AssetId.is_in(ids))
                .order_by_asc(disposal::Column::DisposalDate)
                .order_by_asc(disposal::Column::Id)
                .all(db)
                .await?;
            // Ascending order, so the last write per asset wins
            for record in records {
                latest.insert(record.asset_id, record);
            }
        }

        Ok(assets
            .into_iter()
            .map(|a| {
                let record = latest.remove(&a.id);
                DisposalLine {
                    asset_id: a.id,
                    name: a.name,
                    serial_number: a.serial_number,
                    disposal_date: record.as_ref().map(|r| r.disposal_date),
                    reason: record.and_then(|r| r.reason),
                }
            })
            .collect())
    }
}
