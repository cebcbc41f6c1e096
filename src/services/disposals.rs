use crate::{
    commands::{
        disposals::{DisposeAssetCommand, DisposeAssetResult},
        Command,
    },
    db::DbPool,
    entities::disposal,
    errors::ServiceError,
    events::EventSender,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct DisposalService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DisposalService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Marks the asset `Disposed` and records the disposal.
    #[instrument(skip(self, command), fields(asset_id = command.asset_id))]
    pub async fn dispose(
        &self,
        command: DisposeAssetCommand,
    ) -> Result<DisposeAssetResult, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn for_asset(&self, asset_id: i32) -> Result<Vec<disposal::Model>, ServiceError> {
        Ok(disposal::Entity::find()
            .filter(disposal::Column::AssetId.eq(asset_id))
            .order_by_desc(disposal::Column::DisposalDate)
            .all(self.db_pool.as_ref())
            .await?)
    }
}
