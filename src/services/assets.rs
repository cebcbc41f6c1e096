use crate::{
    barcode::{ArtifactReport, BarcodeManager},
    commands::{
        assets::{RegisterAssetCommand, RelocateAssetCommand, RelocationOutcome, UpdateAssetCommand},
        Command,
    },
    db::DbPool,
    entities::{asset, asset_movement, category, location, sub_category, sub_location},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

/// Equality filters for asset listings; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    pub status: Option<String>,
    pub location_id: Option<i32>,
    pub sublocation_id: Option<i32>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetPage {
    pub items: Vec<asset::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredAsset {
    pub asset: asset::Model,
    pub artifact: ArtifactReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelocationReport {
    pub outcome: RelocationOutcome,
    /// Present when the serial number changed and the barcode was swapped.
    pub artifact: Option<ArtifactReport>,
}

/// An asset with its registry references resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssetDetail {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub serial_number: String,
    pub depreciation: f64,
    pub purchased_on: chrono::NaiveDate,
    pub purchase_price: Option<f64>,
    pub location: RegistryRef,
    pub sublocation: RegistryRef,
    pub category: RegistryRef,
    pub subcategory: RegistryRef,
    pub barcode_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistryRef {
    pub id: i32,
    pub code: String,
    pub name: String,
}

/// Service for registering, querying and moving assets
#[derive(Clone)]
pub struct AssetService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    barcodes: BarcodeManager,
}

impl AssetService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        barcodes: BarcodeManager,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            barcodes,
        }
    }

    pub fn barcodes(&self) -> &BarcodeManager {
        &self.barcodes
    }

    /// Registers an asset, then renders its barcode (best effort).
    #[instrument(skip(self, command), fields(name = %command.name))]
    pub async fn register(
        &self,
        command: RegisterAssetCommand,
    ) -> Result<RegisteredAsset, ServiceError> {
        let asset = command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await?;

        let artifact = self.barcodes.ensure(&asset.serial_number).await;
        self.report_artifact(&asset, &artifact).await;

        Ok(RegisteredAsset { asset, artifact })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, asset_id: i32) -> Result<asset::Model, ServiceError> {
        crate::commands::assets::find_asset(self.db_pool.as_ref(), asset_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_serial(&self, serial: &str) -> Result<asset::Model, ServiceError> {
        asset::Entity::find()
            .filter(asset::Column::SerialNumber.eq(serial))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No asset with serial number {}", serial)))
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, asset_id: i32) -> Result<AssetDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let asset = self.get(asset_id).await?;

        let location = location::Entity::find_by_id(asset.location_id).one(db).await?;
        let sublocation = sub_location::Entity::find_by_id(asset.sublocation_id).one(db).await?;
        let category = category::Entity::find_by_id(asset.category_id).one(db).await?;
        let subcategory = sub_category::Entity::find_by_id(asset.subcategory_id).one(db).await?;

        let missing = |what: &str, id: i32| {
            ServiceError::InternalError(format!("Asset {} references missing {} {}", asset_id, what, id))
        };
        let location = location.ok_or_else(|| missing("location", asset.location_id))?;
        let sublocation = sublocation.ok_or_else(|| missing("sublocation", asset.sublocation_id))?;
        let category = category.ok_or_else(|| missing("category", asset.category_id))?;
        let subcategory = subcategory.ok_or_else(|| missing("subcategory", asset.subcategory_id))?;

        let barcode_present = match self.barcodes.exists(&asset.serial_number).await {
            Ok(present) => present,
            Err(e) => {
                warn!(asset_id, error = %e, "Could not check barcode artifact");
                false
            }
        };

        Ok(AssetDetail {
            id: asset.id,
            name: asset.name,
            asset_type: asset.asset_type,
            status: asset.status,
            assigned_to: asset.assigned_to,
            serial_number: asset.serial_number,
            depreciation: asset.depreciation,
            purchased_on: asset.purchased_on,
            purchase_price: asset.purchase_price,
            location: RegistryRef {
                id: location.id,
                code: location.code,
                name: location.name,
            },
            sublocation: RegistryRef {
                id: sublocation.id,
                code: sublocation.code,
                name: sublocation.name,
            },
            category: RegistryRef {
                id: category.id,
                code: category.code,
                name: category.name,
            },
            subcategory: RegistryRef {
                id: subcategory.id,
                code: subcategory.code,
                name: subcategory.name,
            },
            barcode_present,
        })
    }

    /// Lists assets matching `filter`, newest first. `page` is 1-based.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &AssetFilter,
        page: u64,
        limit: u64,
    ) -> Result<AssetPage, ServiceError> {
        let mut query = asset::Entity::find();
        if let Some(status) = &filter.status {
            query = query.filter(asset::Column::Status.eq(status.as_str()));
        }
        if let Some(id) = filter.location_id {
            query = query.filter(asset::Column::LocationId.eq(id));
        }
        if let Some(id) = filter.sublocation_id {
            query = query.filter(asset::Column::SublocationId.eq(id));
        }
        if let Some(id) = filter.category_id {
            query = query.filter(asset::Column::CategoryId.eq(id));
        }
        if let Some(id) = filter.subcategory_id {
            query = query.filter(asset::Column::SubcategoryId.eq(id));
        }

        let page = page.max(1);
        let limit = limit.max(1);
        let paginator = query
            .order_by_desc(asset::Column::Id)
            .paginate(self.db_pool.as_ref(), limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok(AssetPage {
            items,
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self, command), fields(asset_id = command.asset_id))]
    pub async fn update(&self, command: UpdateAssetCommand) -> Result<asset::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Moves an asset. When the serial number changes the barcode is swapped
    /// after the commit; artifact failures only show up in the report.
    #[instrument(skip(self, command), fields(asset_id = command.asset_id))]
    pub async fn relocate(
        &self,
        command: RelocateAssetCommand,
    ) -> Result<RelocationReport, ServiceError> {
        let outcome = command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await?;

        let artifact = match &outcome {
            RelocationOutcome::Moved(relocation) => match &relocation.previous_serial {
                Some(old_serial) => {
                    let report = self
                        .barcodes
                        .swap(old_serial, &relocation.asset.serial_number)
                        .await;
                    self.report_artifact(&relocation.asset, &report).await;
                    Some(report)
                }
                None => None,
            },
            RelocationOutcome::Unchanged(_) => None,
        };

        Ok(RelocationReport { outcome, artifact })
    }

    /// Re-renders the barcode under the current serial number. Here the
    /// barcode is the whole operation, so failures are returned.
    #[instrument(skip(self))]
    pub async fn regenerate_barcode(&self, asset_id: i32) -> Result<asset::Model, ServiceError> {
        let asset = self.get(asset_id).await?;
        self.barcodes.publish(&asset.serial_number).await?;

        info!(asset_id, serial_number = %asset.serial_number, "Barcode regenerated");
        self.event_sender
            .send_or_log(Event::BarcodeRegenerated {
                asset_id,
                serial_number: asset.serial_number.clone(),
            })
            .await;

        Ok(asset)
    }

    /// PNG bytes of the asset's current barcode.
    #[instrument(skip(self))]
    pub async fn barcode_png(&self, asset_id: i32) -> Result<Vec<u8>, ServiceError> {
        let asset = self.get(asset_id).await?;
        self.barcodes
            .fetch(&asset.serial_number)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No barcode stored for serial number {}",
                    asset.serial_number
                ))
            })
    }

    /// Relocation history, oldest first.
    #[instrument(skip(self))]
    pub async fn movements(
        &self,
        asset_id: i32,
    ) -> Result<Vec<asset_movement::Model>, ServiceError> {
        let asset = self.get(asset_id).await?;
        Ok(asset_movement::Entity::find()
            .filter(asset_movement::Column::AssetId.eq(asset.id))
            .order_by_asc(asset_movement::Column::Id)
            .all(self.db_pool.as_ref())
            .await?)
    }

    async fn report_artifact(&self, asset: &asset::Model, report: &ArtifactReport) {
        if report.is_clean() {
            if report.written.is_some() {
                self.event_sender
                    .send_or_log(Event::BarcodeRegenerated {
                        asset_id: asset.id,
                        serial_number: asset.serial_number.clone(),
                    })
                    .await;
            }
            return;
        }

        self.event_sender
            .send_or_log(Event::BarcodeArtifactFailed {
                asset_id: asset.id,
                serial_number: asset.serial_number.clone(),
                error: report.errors.join("; "),
            })
            .await;
    }
}
