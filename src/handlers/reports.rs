use crate::{
    services::reports::{DepreciationLine, DisposalLine},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepreciationQuery {
    /// Valuation date, today (UTC) when omitted
    pub as_of: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/depreciation",
    params(DepreciationQuery),
    responses(
        (status = 200, description = "Straight-line depreciation per asset", body = ApiResponse<Vec<DepreciationLine>>)
    ),
    tag = "reports"
)]
pub async fn depreciation_report(
    State(state): State<AppState>,
    Query(query): Query<DepreciationQuery>,
) -> ApiResult<Vec<DepreciationLine>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let lines = state.report_service().depreciation(as_of).await?;
    Ok(Json(ApiResponse::success(lines)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/disposals",
    responses(
        (status = 200, description = "Disposed assets with their latest disposal", body = ApiResponse<Vec<DisposalLine>>)
    ),
    tag = "reports"
)]
pub async fn disposal_report(State(state): State<AppState>) -> ApiResult<Vec<DisposalLine>> {
    let lines = state.report_service().disposals().await?;
    Ok(Json(ApiResponse::success(lines)))
}
