use crate::{
    commands::maintenance::ScheduleMaintenanceCommand,
    entities::maintenance,
    handlers::common::{created, ApiCreated},
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
#[schema(example = json!({
    "id": 7,
    "asset_id": 1,
    "start_date": "2024-03-01",
    "end_date": "2024-03-03",
    "type": "Preventive",
    "description": "Battery replacement"
}))]
pub struct MaintenanceSummary {
    pub id: i32,
    pub asset_id: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub maintenance_type: String,
    pub description: Option<String>,
}

impl From<maintenance::Model> for MaintenanceSummary {
    fn from(model: maintenance::Model) -> Self {
        Self {
            id: model.id,
            asset_id: model.asset_id,
            start_date: model.start_date,
            end_date: model.end_date,
            maintenance_type: model.maintenance_type,
            description: model.description,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/assets/{id}/maintenance",
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = ScheduleMaintenanceCommand,
    responses(
        (status = 201, description = "Maintenance scheduled", body = ApiResponse<MaintenanceSummary>),
        (status = 400, description = "Invalid dates or type", body = crate::errors::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse)
    ),
    tag = "maintenance"
)]
pub async fn schedule_maintenance(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut payload): Json<ScheduleMaintenanceCommand>,
) -> ApiCreated<MaintenanceSummary> {
    payload.asset_id = id;
    let record = state.maintenance_service().schedule(payload).await?;
    Ok(created(MaintenanceSummary::from(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}/maintenance",
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Maintenance history, most recent first", body = ApiResponse<Vec<MaintenanceSummary>>),
        (status = 404, description = "Asset not found", body = crate::errors::ErrorResponse)
    ),
    tag = "maintenance"
)]
pub async fn maintenance_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<MaintenanceSummary>> {
    let rows = state.maintenance_service().history(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(MaintenanceSummary::from).collect(),
    )))
}
