use crate::{
    barcode::ArtifactReport,
    commands::assets::{RegisterAssetCommand, RelocateAssetCommand, RelocationOutcome, UpdateAssetCommand},
    entities::{asset, asset_movement},
    handlers::common::{created, paginated, ApiCreated},
    services::assets::{AssetDetail, AssetFilter},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssetListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub location_id: Option<i32>,
    pub sublocation_id: Option<i32>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
}

impl AssetListQuery {
    fn filter(&self) -> AssetFilter {
        AssetFilter {
            status: self.status.clone(),
            location_id: self.location_id,
            sublocation_id: self.sublocation_id,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "Laptop 14",
    "type": "Laptop",
    "serial_number": "HQ-ELEC-RM1-001",
    "status": "Active",
    "category_id": 1,
    "subcategory_id": 1,
    "location_id": 1,
    "sublocation_id": 1,
    "assigned_to": null,
    "depreciation": 250.0,
    "purchased_on": "2024-01-15",
    "purchase_price": 1200.0,
    "created_at": "2024-01-15T09:30:00Z",
    "updated_at": "2024-01-15T09:30:00Z"
}))]
pub struct AssetSummary {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    /// `{location}-{category}-{sublocation}-{sequence}`
    pub serial_number: String,
    pub status: String,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub location_id: i32,
    pub sublocation_id: i32,
    pub assigned_to: Option<String>,
    /// Annual depreciation amount
    pub depreciation: f64,
    pub purchased_on: NaiveDate,
    pub purchase_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<asset::Model> for AssetSummary {
    fn from(model: asset::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            asset_type: model.asset_type,
            serial_number: model.serial_number,
            status: model.status,
            category_id: model.category_id,
            subcategory_id: model.subcategory_id,
            location_id: model.location_id,
            sublocation_id: model.sublocation_id,
            assigned_to: model.assigned_to,
            depreciation: model.depreciation,
            purchased_on: model.purchased_on,
            purchase_price: model.purchase_price,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovementSummary {
    pub id: i32,
    pub asset_id: i32,
    pub from_location_id: i32,
    pub to_location_id: i32,
    pub movement_date: NaiveDate,
}

impl From<asset_movement::Model> for MovementSummary {
    fn from(model: asset_movement::Model) -> Self {
        Self {
            id: model.id,
            asset_id: model.asset_id,
            from_location_id: model.from_location_id,
            to_location_id: model.to_location_id,
            movement_date: model.movement_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterAssetResponse {
    pub asset: AssetSummary,
    /// Barcode outcome; failures here do not undo the registration
    pub barcode: ArtifactReport,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MoveAssetResponse {
    /// False when the asset was already at the requested placement
    pub changed: bool,
    pub message: String,
    pub asset: AssetSummary,
    pub movement: Option<MovementSummary>,
    /// Serial number before the move, when the move rewrote it
    pub previous_serial: Option<String>,
    /// Barcode outcome when the serial number changed
    pub barcode: Option<ArtifactReport>,
}

#[utoipa::path(
    get,
    path = "/api/v1/assets",
    params(AssetListQuery),
    responses(
        (status = 200, description = "Assets listed", body = ApiResponse<PaginatedResponse<AssetSummary>>)
    ),
    tag = "assets"
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetListQuery>,
) -> ApiResult<PaginatedResponse<AssetSummary>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = state.config.page_size(query.limit);

    let result = state
        .asset_service()
        .list(&query.filter(), page, limit)
        .await?;

    let items = result.items.into_iter().map(AssetSummary::from).collect();
    Ok(Json(ApiResponse::success(paginated(
        items,
        result.total,
        result.page,
        result.limit,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets",
    request_body = RegisterAssetCommand,
    responses(
        (status = 201, description = "Asset registered", body = ApiResponse<RegisterAssetResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Registry reference not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Serial number already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn register_asset(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAssetCommand>,
) -> ApiCreated<RegisterAssetResponse> {
    let registered = state.asset_service().register(payload).await?;
    Ok(created(RegisterAssetResponse {
        asset: AssetSummary::from(registered.asset),
        barcode: registered.artifact,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset with resolved registry codes", body = ApiResponse<AssetDetail>),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<AssetDetail> {
    let detail = state.asset_service().detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/by-serial/{serial}",
    params(("serial" = String, Path, description = "Serial number")),
    responses(
        (status = 200, description = "Asset fetched", body = ApiResponse<AssetSummary>),
        (status = 404, description = "No asset with this serial number", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn get_asset_by_serial(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> ApiResult<AssetSummary> {
    let model = state.asset_service().get_by_serial(&serial).await?;
    Ok(Json(ApiResponse::success(AssetSummary::from(model))))
}

#[utoipa::path(
    put,
    path = "/api/v1/assets/{id}",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateAssetCommand,
    responses(
        (status = 200, description = "Asset updated", body = ApiResponse<AssetSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<UpdateAssetCommand>,
) -> ApiResult<AssetSummary> {
    payload.asset_id = id;
    let model = state.asset_service().update(payload).await?;
    Ok(Json(ApiResponse::success(AssetSummary::from(model))))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/move",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = RelocateAssetCommand,
    responses(
        (status = 200, description = "Asset relocated, or already in place", body = ApiResponse<MoveAssetResponse>),
        (status = 400, description = "Sublocation does not belong to location", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset or registry reference not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "New serial number already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn move_asset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<RelocateAssetCommand>,
) -> ApiResult<MoveAssetResponse> {
    payload.asset_id = id;
    let report = state.asset_service().relocate(payload).await?;

    let response = match report.outcome {
        RelocationOutcome::Unchanged(asset) => MoveAssetResponse {
            changed: false,
            message: "No changes: asset is already at this location".to_string(),
            asset: AssetSummary::from(asset),
            movement: None,
            previous_serial: None,
            barcode: None,
        },
        RelocationOutcome::Moved(relocation) => MoveAssetResponse {
            changed: true,
            message: if relocation.serial_changed() {
                "Asset moved and serial number updated".to_string()
            } else {
                "Asset moved within its location".to_string()
            },
            asset: AssetSummary::from(relocation.asset),
            movement: Some(MovementSummary::from(relocation.movement)),
            previous_serial: relocation.previous_serial,
            barcode: report.artifact,
        },
    };

    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/movements",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Relocation history, oldest first", body = ApiResponse<Vec<MovementSummary>>),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<MovementSummary>> {
    let rows = state.asset_service().movements(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(MovementSummary::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/barcode",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Barcode re-rendered under the current serial number", body = ApiResponse<AssetSummary>),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Barcode could not be written", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn regenerate_barcode(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<AssetSummary> {
    let model = state.asset_service().regenerate_barcode(id).await?;
    Ok(Json(ApiResponse::success(AssetSummary::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/barcode",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Code 128 PNG of the serial number", content_type = "image/png"),
        (status = 404, description = "Asset or barcode not found", body = crate::errors::ErrorResponse)
    ),
    tag = "assets"
)]
pub async fn get_barcode(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, crate::errors::ServiceError> {
    let png = state.asset_service().barcode_png(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
