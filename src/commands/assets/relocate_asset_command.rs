use crate::{
    commands::{flatten_transaction_error, Command},
    db::DbPool,
    entities::{asset, asset_movement, category},
    errors::ServiceError,
    events::{Event, EventSender},
    serial_number::{Sequence, SerialNumber},
};
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::{find_asset, resolve_placement};

lazy_static! {
    static ref ASSET_RELOCATIONS: IntCounter = crate::metrics::int_counter(
        "asset_relocations_total",
        "Relocations that wrote a movement record"
    );
    static ref SERIAL_NUMBER_CHANGES: IntCounter = crate::metrics::int_counter(
        "serial_number_changes_total",
        "Relocations that rewrote a serial number"
    );
    static ref ASSET_RELOCATION_FAILURES: IntCounterVec = crate::metrics::int_counter_vec(
        "asset_relocation_failures_total",
        "Total number of failed relocations",
        &["error_type"]
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelocateAssetCommand {
    #[serde(default)]
    pub asset_id: i32,
    pub location_id: i32,
    pub sublocation_id: i32,
}

/// A committed relocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    pub asset: asset::Model,
    pub movement: asset_movement::Model,
    /// Serial number before the move, when the move rewrote it.
    pub previous_serial: Option<String>,
}

impl Relocation {
    pub fn serial_changed(&self) -> bool {
        self.previous_serial.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelocationOutcome {
    /// Target equals the current placement; nothing was written.
    Unchanged(asset::Model),
    Moved(Relocation),
}

impl RelocationOutcome {
    pub fn asset(&self) -> &asset::Model {
        match self {
            RelocationOutcome::Unchanged(asset) => asset,
            RelocationOutcome::Moved(relocation) => &relocation.asset,
        }
    }
}

#[async_trait::async_trait]
impl Command for RelocateAssetCommand {
    type Result = RelocationOutcome;

    #[instrument(skip(self, db_pool, event_sender), fields(asset_id = self.asset_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let outcome = self.relocate(db_pool.as_ref()).await.map_err(|e| {
            let label = match &e {
                ServiceError::NotFound(_) => "not_found",
                ServiceError::Conflict(_) => "conflict",
                ServiceError::ValidationError(_) => "validation_error",
                _ => "db_error",
            };
            ASSET_RELOCATION_FAILURES.with_label_values(&[label]).inc();
            warn!("Relocation of asset {} failed: {}", self.asset_id, e);
            e
        })?;

        match &outcome {
            RelocationOutcome::Unchanged(_) => {
                info!(asset_id = self.asset_id, "Relocation requested with no changes");
            }
            RelocationOutcome::Moved(relocation) => {
                ASSET_RELOCATIONS.inc();
                event_sender
                    .send_or_log(Event::AssetRelocated {
                        asset_id: relocation.asset.id,
                        movement_id: relocation.movement.id,
                        from_location_id: relocation.movement.from_location_id,
                        to_location_id: relocation.movement.to_location_id,
                    })
                    .await;

                if let Some(old_serial) = &relocation.previous_serial {
                    SERIAL_NUMBER_CHANGES.inc();
                    event_sender
                        .send_or_log(Event::SerialNumberChanged {
                            asset_id: relocation.asset.id,
                            old_serial: old_serial.clone(),
                            new_serial: relocation.asset.serial_number.clone(),
                        })
                        .await;
                }

                info!(
                    asset_id = relocation.asset.id,
                    from_location_id = relocation.movement.from_location_id,
                    to_location_id = relocation.movement.to_location_id,
                    serial_number = %relocation.asset.serial_number,
                    "Asset relocated"
                );
            }
        }

        Ok(outcome)
    }
}

impl RelocateAssetCommand {
    /// Movement row, placement update and serial rewrite commit together.
    async fn relocate(&self, db: &DatabaseConnection) -> Result<RelocationOutcome, ServiceError> {
        let cmd = self.clone();
        db.transaction::<_, RelocationOutcome, ServiceError>(|txn| {
            Box::pin(async move {
                let current = find_asset(txn, cmd.asset_id).await?;

                if current.location_id == cmd.location_id
                    && current.sublocation_id == cmd.sublocation_id
                {
                    return Ok(RelocationOutcome::Unchanged(current));
                }

                let (location, sublocation) =
                    resolve_placement(txn, cmd.location_id, cmd.sublocation_id).await?;
                let location_changed = current.location_id != location.id;

                let movement = asset_movement::ActiveModel {
                    asset_id: Set(current.id),
                    from_location_id: Set(current.location_id),
                    to_location_id: Set(location.id),
                    movement_date: Set(Utc::now().date_naive()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let previous_serial = current.serial_number.clone();
                let mut active: asset::ActiveModel = current.clone().into();
                active.location_id = Set(location.id);
                active.sublocation_id = Set(sublocation.id);

                let mut serial_changed = false;
                if location_changed {
                    let category = category::Entity::find_by_id(current.category_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Category {} not found",
                                current.category_id
                            ))
                        })?;
                    let serial = SerialNumber::compose(
                        &location.code,
                        &category.code,
                        &sublocation.code,
                        &Sequence::carried_from(&current.serial_number),
                    );
                    serial_changed = serial.as_str() != previous_serial;
                    active.serial_number = Set(serial.into_string());
                }

                let asset = active.update(txn).await.map_err(|e| match ServiceError::from(e) {
                    ServiceError::Conflict(_) => ServiceError::Conflict(format!(
                        "Relocating asset {} would duplicate an existing serial number",
                        cmd.asset_id
                    )),
                    other => other,
                })?;

                Ok(RelocationOutcome::Moved(Relocation {
                    asset,
                    movement,
                    previous_serial: serial_changed.then_some(previous_serial),
                }))
            })
        })
        .await
        .map_err(flatten_transaction_error)
    }
}
