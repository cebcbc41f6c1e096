use crate::{
    entities::{category, location, sub_category, sub_location},
    handlers::common::{created, ApiCreated},
    services::registry::{CreateCodeRequest, CreateSubCategoryRequest, CreateSubLocationRequest},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"id": 1, "name": "Headquarters", "code": "HQ"}))]
pub struct LocationSummary {
    pub id: i32,
    pub name: String,
    /// First serial-number segment
    pub code: String,
}

impl From<location::Model> for LocationSummary {
    fn from(model: location::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"id": 3, "name": "Room 1", "code": "RM1", "location_id": 1}))]
pub struct SubLocationSummary {
    pub id: i32,
    pub name: String,
    /// Third serial-number segment, unique within its location
    pub code: String,
    pub location_id: i32,
}

impl From<sub_location::Model> for SubLocationSummary {
    fn from(model: sub_location::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            location_id: model.location_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"id": 2, "name": "Electronics", "code": "ELEC"}))]
pub struct CategorySummary {
    pub id: i32,
    pub name: String,
    /// Second serial-number segment
    pub code: String,
}

impl From<category::Model> for CategorySummary {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubCategorySummary {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub category_id: i32,
}

impl From<sub_category::Model> for SubCategorySummary {
    fn from(model: sub_category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            category_id: model.category_id,
        }
    }
}

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubLocationQuery {
    /// Only sublocations of this location
    pub location_id: Option<i32>,
}

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubCategoryQuery {
    /// Only subcategories of this category
    pub category_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "Locations listed", body = ApiResponse<Vec<LocationSummary>>)
    ),
    tag = "registry"
)]
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<Vec<LocationSummary>> {
    let locations = state.registry_service().list_locations().await?;
    Ok(Json(ApiResponse::success(
        locations.into_iter().map(LocationSummary::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = CreateCodeRequest,
    responses(
        (status = 201, description = "Location created", body = ApiResponse<LocationSummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateCodeRequest>,
) -> ApiCreated<LocationSummary> {
    let model = state.registry_service().create_location(payload).await?;
    Ok(created(LocationSummary::from(model)))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}",
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location fetched", body = ApiResponse<LocationSummary>),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<LocationSummary> {
    let model = state.registry_service().get_location(id).await?;
    Ok(Json(ApiResponse::success(LocationSummary::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/sublocations",
    params(SubLocationQuery),
    responses(
        (status = 200, description = "Sublocations listed", body = ApiResponse<Vec<SubLocationSummary>>)
    ),
    tag = "registry"
)]
pub async fn list_sublocations(
    State(state): State<AppState>,
    Query(query): Query<SubLocationQuery>,
) -> ApiResult<Vec<SubLocationSummary>> {
    let rows = state
        .registry_service()
        .list_sublocations(query.location_id)
        .await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(SubLocationSummary::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/sublocations",
    request_body = CreateSubLocationRequest,
    responses(
        (status = 201, description = "Sublocation created", body = ApiResponse<SubLocationSummary>),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already exists in this location", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn create_sublocation(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubLocationRequest>,
) -> ApiCreated<SubLocationSummary> {
    let model = state.registry_service().create_sublocation(payload).await?;
    Ok(created(SubLocationSummary::from(model)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories listed", body = ApiResponse<Vec<CategorySummary>>)
    ),
    tag = "registry"
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategorySummary>> {
    let rows = state.registry_service().list_categories().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(CategorySummary::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCodeRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategorySummary>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCodeRequest>,
) -> ApiCreated<CategorySummary> {
    let model = state.registry_service().create_category(payload).await?;
    Ok(created(CategorySummary::from(model)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category fetched", body = ApiResponse<CategorySummary>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<CategorySummary> {
    let model = state.registry_service().get_category(id).await?;
    Ok(Json(ApiResponse::success(CategorySummary::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/subcategories",
    params(SubCategoryQuery),
    responses(
        (status = 200, description = "Subcategories listed", body = ApiResponse<Vec<SubCategorySummary>>)
    ),
    tag = "registry"
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
    Query(query): Query<SubCategoryQuery>,
) -> ApiResult<Vec<SubCategorySummary>> {
    let rows = state
        .registry_service()
        .list_subcategories(query.category_id)
        .await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(SubCategorySummary::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/subcategories",
    request_body = CreateSubCategoryRequest,
    responses(
        (status = 201, description = "Subcategory created", body = ApiResponse<SubCategorySummary>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already exists in this category", body = crate::errors::ErrorResponse)
    ),
    tag = "registry"
)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubCategoryRequest>,
) -> ApiCreated<SubCategorySummary> {
    let model = state.registry_service().create_subcategory(payload).await?;
    Ok(created(SubCategorySummary::from(model)))
}
