use crate::{
    commands::{maintenance::ScheduleMaintenanceCommand, Command},
    db::DbPool,
    entities::maintenance,
    errors::ServiceError,
    events::EventSender,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct MaintenanceService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MaintenanceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command), fields(asset_id = command.asset_id))]
    pub async fn schedule(
        &self,
        command: ScheduleMaintenanceCommand,
    ) -> Result<maintenance::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Maintenance records of one asset, most recent start first.
    #[instrument(skip(self))]
    pub async fn history(&self, asset_id: i32) -> Result<Vec<maintenance::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        crate::commands::assets::find_asset(db, asset_id).await?;

        Ok(maintenance::Entity::find()
            .filter(maintenance::Column::AssetId.eq(asset_id))
            .order_by_desc(maintenance::Column::StartDate)
            .order_by_desc(maintenance::Column::Id)
            .all(db)
            .await?)
    }
}
