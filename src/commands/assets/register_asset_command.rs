use crate::{
    commands::Command,
    db::DbPool,
    entities::asset,
    errors::{is_lock_contention, ServiceError},
    events::{Event, EventSender},
    serial_number::{Sequence, SerialNumber},
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::{resolve_classification, resolve_placement};

lazy_static! {
    static ref ASSET_REGISTRATIONS: IntCounter = crate::metrics::int_counter(
        "asset_registrations_total",
        "Total number of registered assets"
    );
    static ref ASSET_REGISTRATION_FAILURES: IntCounterVec = crate::metrics::int_counter_vec(
        "asset_registration_failures_total",
        "Total number of failed asset registrations",
        &["error_type"]
    );
}

pub const DEFAULT_STATUS: &str = "Active";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterAssetCommand {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"))]
    pub asset_type: String,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub location_id: i32,
    pub sublocation_id: i32,
    #[serde(default = "default_status")]
    #[validate(length(min = 1, max = 50, message = "Status must be between 1 and 50 characters"))]
    pub status: String,
    #[validate(length(max = 100, message = "Assignee must be at most 100 characters"))]
    pub assigned_to: Option<String>,
    /// Annual depreciation amount
    #[serde(default)]
    pub depreciation: f64,
    pub purchased_on: NaiveDate,
    pub purchase_price: Option<f64>,
}

#[async_trait::async_trait]
impl Command for RegisterAssetCommand {
    type Result = asset::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(name = %self.name))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        if let Err(e) = self.check() {
            ASSET_REGISTRATION_FAILURES
                .with_label_values(&["validation_error"])
                .inc();
            error!("Invalid asset registration: {}", e);
            return Err(e);
        }

        let asset = self.insert_asset(db_pool.as_ref()).await.map_err(|e| {
            let label = match &e {
                ServiceError::Conflict(_) => "conflict",
                ServiceError::NotFound(_) => "not_found",
                ServiceError::ValidationError(_) => "validation_error",
                _ => "db_error",
            };
            ASSET_REGISTRATION_FAILURES.with_label_values(&[label]).inc();
            warn!("Asset registration failed: {}", e);
            e
        })?;

        event_sender
            .send_or_log(Event::AssetRegistered {
                asset_id: asset.id,
                serial_number: asset.serial_number.clone(),
            })
            .await;

        ASSET_REGISTRATIONS.inc();
        info!(
            asset_id = asset.id,
            serial_number = %asset.serial_number,
            "Asset registered"
        );

        Ok(asset)
    }
}

impl RegisterAssetCommand {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if !self.depreciation.is_finite() || self.depreciation < 0.0 {
            return Err(ServiceError::ValidationError(
                "Depreciation must be a non-negative number".to_string(),
            ));
        }
        if let Some(price) = self.purchase_price {
            if !price.is_finite() || price < 0.0 {
                return Err(ServiceError::ValidationError(
                    "Purchase price must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn active_model(&self, serial_number: String) -> asset::ActiveModel {
        let now = Utc::now();
        asset::ActiveModel {
            name: Set(self.name.clone()),
            asset_type: Set(self.asset_type.clone()),
            category_id: Set(self.category_id),
            subcategory_id: Set(self.subcategory_id),
            location_id: Set(self.location_id),
            sublocation_id: Set(self.sublocation_id),
            status: Set(self.status.clone()),
            assigned_to: Set(self.assigned_to.clone()),
            depreciation: Set(self.depreciation),
            purchased_on: Set(self.purchased_on),
            purchase_price: Set(self.purchase_price),
            serial_number: Set(serial_number),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// Counts the (category, subcategory) peers and inserts under the derived
    /// serial. Concurrent registrations can derive the same serial; the unique
    /// index rejects the later insert as a Conflict.
    ///
    /// On SQLite the loser of that race usually fails earlier, when its read
    /// transaction tries to take the write lock. The derived serial is then
    /// inserted again as a single statement, which waits for the lock, so the
    /// unique index still decides the outcome.
    async fn insert_asset(&self, db: &DatabaseConnection) -> Result<asset::Model, ServiceError> {
        let cmd = self.clone();
        let attempt = db
            .transaction::<_, asset::Model, InsertError>(|txn| {
                Box::pin(async move {
                    let (location, sublocation) =
                        resolve_placement(txn, cmd.location_id, cmd.sublocation_id).await?;
                    let (category, subcategory) =
                        resolve_classification(txn, cmd.category_id, cmd.subcategory_id).await?;

                    let peers = asset::Entity::find()
                        .filter(asset::Column::CategoryId.eq(category.id))
                        .filter(asset::Column::SubcategoryId.eq(subcategory.id))
                        .count(txn)
                        .await?;

                    let serial = SerialNumber::compose(
                        &location.code,
                        &category.code,
                        &sublocation.code,
                        &Sequence::next_after(peers),
                    )
                    .into_string();

                    match cmd.active_model(serial.clone()).insert(txn).await {
                        Ok(model) => Ok(model),
                        Err(e) if is_lock_contention(&e) => Err(InsertError::Contended(serial)),
                        Err(e) => Err(InsertError::Service(serial_conflict(e, &serial))),
                    }
                })
            })
            .await;

        match attempt {
            Ok(model) => Ok(model),
            Err(TransactionError::Transaction(InsertError::Contended(serial))) => {
                warn!(serial_number = %serial, "Write lock contended; retrying insert of derived serial");
                self.active_model(serial.clone())
                    .insert(db)
                    .await
                    .map_err(|e| serial_conflict(e, &serial))
            }
            Err(TransactionError::Transaction(InsertError::Service(e))) => Err(e),
            Err(TransactionError::Connection(e)) => Err(ServiceError::db_error(e)),
        }
    }
}

/// Failure inside the registration transaction.
#[derive(Debug, thiserror::Error)]
enum InsertError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Another connection held the write lock when the insert ran.
    #[error("write lock contended while inserting serial number {0}")]
    Contended(String),
}

impl From<DbErr> for InsertError {
    fn from(err: DbErr) -> Self {
        InsertError::Service(err.into())
    }
}

fn serial_conflict(err: DbErr, serial: &str) -> ServiceError {
    match ServiceError::from(err) {
        ServiceError::Conflict(_) => {
            ServiceError::Conflict(format!("Serial number {} is already in use", serial))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn command() -> RegisterAssetCommand {
        RegisterAssetCommand {
            name: "Laptop 14".into(),
            asset_type: "Laptop".into(),
            category_id: 1,
            subcategory_id: 1,
            location_id: 1,
            sublocation_id: 1,
            status: DEFAULT_STATUS.into(),
            assigned_to: None,
            depreciation: 250.0,
            purchased_on: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            purchase_price: Some(1200.0),
        }
    }

    #[test]
    fn accepts_well_formed_input() {
        assert!(command().check().is_ok());
    }

    #[test]
    fn rejects_blank_name_and_negative_amounts() {
        let mut cmd = command();
        cmd.name = String::new();
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));

        let mut cmd = command();
        cmd.depreciation = -1.0;
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));

        let mut cmd = command();
        cmd.purchase_price = Some(f64::NAN);
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn rejects_text_wider_than_its_column() {
        let mut cmd = command();
        cmd.name = "x".repeat(100);
        assert!(cmd.check().is_ok());
        cmd.name = "x".repeat(101);
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));

        let mut cmd = command();
        cmd.asset_type = "t".repeat(51);
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));

        let mut cmd = command();
        cmd.assigned_to = Some("a".repeat(101));
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn deserializes_type_field_and_defaults_status() {
        let cmd: RegisterAssetCommand = serde_json::from_value(serde_json::json!({
            "name": "Phone",
            "type": "Handset",
            "category_id": 1,
            "subcategory_id": 2,
            "location_id": 3,
            "sublocation_id": 4,
            "purchased_on": "2024-02-01"
        }))
        .unwrap();
        assert_eq!(cmd.asset_type, "Handset");
        assert_eq!(cmd.status, DEFAULT_STATUS);
        assert_eq!(cmd.depreciation, 0.0);
    }
}
