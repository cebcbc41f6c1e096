use crate::{
    commands::disposals::DisposeAssetCommand,
    entities::disposal,
    handlers::{
        assets::AssetSummary,
        common::{created, ApiCreated},
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisposalSummary {
    pub id: i32,
    pub asset_id: i32,
    pub disposal_date: NaiveDate,
    pub reason: Option<String>,
}

impl From<disposal::Model> for DisposalSummary {
    fn from(model: disposal::Model) -> Self {
        Self {
            id: model.id,
            asset_id: model.asset_id,
            disposal_date: model.disposal_date,
            reason: model.reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisposeAssetResponse {
    pub asset: AssetSummary,
    pub disposal: DisposalSummary,
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/dispose",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = DisposeAssetCommand,
    responses(
        (status = 201, description = "Asset disposed", body = ApiResponse<DisposeAssetResponse>),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Asset already disposed", body = crate::errors::ErrorResponse)
    ),
    tag = "disposals"
)]
pub async fn dispose_asset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<DisposeAssetCommand>,
) -> ApiCreated<DisposeAssetResponse> {
    payload.asset_id = id;
    let result = state.disposal_service().dispose(payload).await?;
    Ok(created(DisposeAssetResponse {
        asset: AssetSummary::from(result.asset),
        disposal: DisposalSummary::from(result.disposal),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/disposals",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Disposal records of the asset", body = ApiResponse<Vec<DisposalSummary>>)
    ),
    tag = "disposals"
)]
pub async fn list_disposals(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<DisposalSummary>> {
    let rows = state.disposal_service().for_asset(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(DisposalSummary::from).collect(),
    )))
}
