use crate::{
    commands::{assets::find_asset, flatten_transaction_error, Command},
    db::DbPool,
    entities::{asset, disposal},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

lazy_static! {
    static ref ASSET_DISPOSALS: IntCounter = crate::metrics::int_counter(
        "asset_disposals_total",
        "Total number of disposed assets"
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DisposeAssetCommand {
    #[serde(default)]
    pub asset_id: i32,
    /// Defaults to today (UTC)
    pub disposal_date: Option<NaiveDate>,
    #[validate(length(max = 200, message = "Reason must be at most 200 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisposeAssetResult {
    pub asset: asset::Model,
    pub disposal: disposal::Model,
}

#[async_trait::async_trait]
impl Command for DisposeAssetCommand {
    type Result = DisposeAssetResult;

    #[instrument(skip(self, db_pool, event_sender), fields(asset_id = self.asset_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let result = self.dispose(db_pool.as_ref()).await?;

        ASSET_DISPOSALS.inc();
        info!(
            asset_id = result.asset.id,
            disposal_id = result.disposal.id,
            "Asset disposed"
        );
        event_sender
            .send_or_log(Event::AssetDisposed {
                asset_id: result.asset.id,
                disposal_id: result.disposal.id,
            })
            .await;

        Ok(result)
    }
}

impl DisposeAssetCommand {
    /// Status change and disposal row commit together.
    async fn dispose(&self, db: &DatabaseConnection) -> Result<DisposeAssetResult, ServiceError> {
        let cmd = self.clone();
        db.transaction::<_, DisposeAssetResult, ServiceError>(|txn| {
            Box::pin(async move {
                let current = find_asset(txn, cmd.asset_id).await?;
                if current.is_disposed() {
                    return Err(ServiceError::Conflict(format!(
                        "Asset {} is already disposed",
                        current.id
                    )));
                }

                let disposal = disposal::ActiveModel {
                    asset_id: Set(current.id),
                    disposal_date: Set(cmd.disposal_date.unwrap_or_else(|| Utc::now().date_naive())),
                    reason: Set(cmd.reason),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let mut active: asset::ActiveModel = current.into();
                active.status = Set(asset::STATUS_DISPOSED.to_string());
                let asset = active.update(txn).await?;

                Ok(DisposeAssetResult { asset, disposal })
            })
        })
        .await
        .map_err(flatten_transaction_error)
    }
}
