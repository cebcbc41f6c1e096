use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    commands::{assets::find_asset, Command},
    db::DbPool,
    entities::maintenance,
    errors::ServiceError,
    events::{Event, EventSender},
};

lazy_static! {
    static ref MAINTENANCE_SCHEDULED: IntCounter = crate::metrics::int_counter(
        "maintenance_scheduled_total",
        "Total number of maintenance records created"
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScheduleMaintenanceCommand {
    #[serde(default)]
    pub asset_id: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"))]
    pub maintenance_type: String,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
}

#[async_trait]
impl Command for ScheduleMaintenanceCommand {
    type Result = maintenance::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(asset_id = self.asset_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ServiceError::ValidationError(format!(
                    "End date {} precedes start date {}",
                    end, self.start_date
                )));
            }
        }

        let db = db_pool.as_ref();
        let asset = find_asset(db, self.asset_id).await?;

        let record = maintenance::ActiveModel {
            asset_id: Set(asset.id),
            start_date: Set(self.start_date),
            end_date: Set(self.end_date),
            maintenance_type: Set(self.maintenance_type.clone()),
            description: Set(self.description.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        MAINTENANCE_SCHEDULED.inc();
        info!(asset_id = asset.id, maintenance_id = record.id, "Maintenance scheduled");

        event_sender
            .send_or_log(Event::MaintenanceScheduled {
                asset_id: asset.id,
                maintenance_id: record.id,
            })
            .await;

        Ok(record)
    }
}
