use crate::{
    commands::Command,
    db::DbPool,
    entities::asset,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::find_asset;

/// Edits the descriptive fields of an asset. Placement goes through
/// relocation and disposal through the dispose operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAssetCommand {
    #[serde(default)]
    pub asset_id: i32,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"))]
    pub asset_type: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Status must be between 1 and 50 characters"))]
    pub status: Option<String>,
}

impl UpdateAssetCommand {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if self.name.is_none() && self.asset_type.is_none() && self.status.is_none() {
            return Err(ServiceError::ValidationError(
                "Nothing to update: supply name, type or status".to_string(),
            ));
        }
        if self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(asset::STATUS_DISPOSED))
        {
            return Err(ServiceError::ValidationError(
                "Assets are disposed through the dispose operation".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Command for UpdateAssetCommand {
    type Result = asset::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(asset_id = self.asset_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.check()?;

        let db = db_pool.as_ref();
        let current = find_asset(db, self.asset_id).await?;

        let mut active: asset::ActiveModel = current.into();
        if let Some(name) = &self.name {
            active.name = Set(name.clone());
        }
        if let Some(asset_type) = &self.asset_type {
            active.asset_type = Set(asset_type.clone());
        }
        if let Some(status) = &self.status {
            active.status = Set(status.clone());
        }

        let updated = active.update(db).await?;

        event_sender.send_or_log(Event::AssetUpdated(updated.id)).await;
        info!(asset_id = updated.id, "Asset updated");

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_update_is_rejected() {
        let cmd = UpdateAssetCommand {
            asset_id: 1,
            ..Default::default()
        };
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn disposal_status_is_reserved() {
        let cmd = UpdateAssetCommand {
            asset_id: 1,
            status: Some("disposed".into()),
            ..Default::default()
        };
        assert_matches!(cmd.check(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn partial_update_is_accepted() {
        let cmd = UpdateAssetCommand {
            asset_id: 1,
            status: Some("In Repair".into()),
            ..Default::default()
        };
        assert!(cmd.check().is_ok());
    }
}
