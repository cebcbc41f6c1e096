//! Asset Tracker API Library
//!
//! Code registry, serial numbering, barcode artifacts and the asset lifecycle
//! (registration, relocation, maintenance, disposal) behind an HTTP API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod barcode;
pub mod bulk_load;
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod serial_number;
pub mod services;
pub mod tracing;

use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::barcode::BarcodeManager;
use crate::db::DbPool;
use crate::events::EventSender;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DbPool>,
        config: config::AppConfig,
        event_sender: Arc<EventSender>,
        barcodes: BarcodeManager,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), barcodes);
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }

    pub fn registry_service(&self) -> Arc<services::registry::RegistryService> {
        self.services.registry.clone()
    }

    pub fn asset_service(&self) -> Arc<services::assets::AssetService> {
        self.services.assets.clone()
    }

    pub fn maintenance_service(&self) -> Arc<services::maintenance::MaintenanceService> {
        self.services.maintenance.clone()
    }

    pub fn disposal_service(&self) -> Arc<services::disposals::DisposalService> {
        self.services.disposals.clone()
    }

    pub fn report_service(&self) -> Arc<services::reports::ReportService> {
        self.services.reports.clone()
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn request_id_is_omitted_outside_a_request() {
        let response = ApiResponse::success(1);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 1);
        assert!(json["meta"].get("request_id").is_none());
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    let registry = Router::new()
        .route(
            "/locations",
            get(handlers::registry::list_locations).post(handlers::registry::create_location),
        )
        .route("/locations/:id", get(handlers::registry::get_location))
        .route(
            "/sublocations",
            get(handlers::registry::list_sublocations).post(handlers::registry::create_sublocation),
        )
        .route(
            "/categories",
            get(handlers::registry::list_categories).post(handlers::registry::create_category),
        )
        .route("/categories/:id", get(handlers::registry::get_category))
        .route(
            "/subcategories",
            get(handlers::registry::list_subcategories)
                .post(handlers::registry::create_subcategory),
        );

    let assets = Router::new()
        .route(
            "/assets",
            get(handlers::assets::list_assets).post(handlers::assets::register_asset),
        )
        .route(
            "/assets/by-serial/:serial",
            get(handlers::assets::get_asset_by_serial),
        )
        .route(
            "/assets/:id",
            get(handlers::assets::get_asset).put(handlers::assets::update_asset),
        )
        .route("/assets/:id/move", post(handlers::assets::move_asset))
        .route("/assets/:id/movements", get(handlers::assets::list_movements))
        .route(
            "/assets/:id/barcode",
            get(handlers::assets::get_barcode).post(handlers::assets::regenerate_barcode),
        );

    let lifecycle = Router::new()
        .route(
            "/assets/:id/maintenance",
            get(handlers::maintenance::maintenance_history)
                .post(handlers::maintenance::schedule_maintenance),
        )
        .route(
            "/assets/:id/dispose",
            post(handlers::disposals::dispose_asset),
        )
        .route(
            "/assets/:id/disposals",
            get(handlers::disposals::list_disposals),
        );

    let reports = Router::new()
        .route(
            "/reports/depreciation",
            get(handlers::reports::depreciation_report),
        )
        .route("/reports/disposals", get(handlers::reports::disposal_report));

    Router::new()
        .merge(registry)
        .merge(assets)
        .merge(lifecycle)
        .merge(reports)
}

async fn metrics_endpoint() -> (StatusCode, String) {
    match metrics::metrics_handler().await {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            ::tracing::error!(error = %e, "Metrics export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics error"),
            )
        }
    }
}

/// Full application router: API, health, metrics and Swagger UI, wrapped in
/// request-id and HTTP tracing layers. CORS and compression are added by the
/// server binary.
pub fn build_router(state: AppState) -> Router {
    let health_state = Arc::new(health::HealthState::new(
        state.db.clone(),
        state.services.assets.barcodes().clone(),
    ));
    build_router_with_health(state, health_state)
}

/// Same as [`build_router`] with a caller-owned health state, so the caller
/// can also drive [`health::run_health_checker`] on it.
pub fn build_router_with_health(state: AppState, health_state: Arc<health::HealthState>) -> Router {
    Router::new()
        .route("/", get(|| async { "asset-tracker-api up" }))
        .route("/metrics", get(metrics_endpoint))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .nest("/health", health::health_routes(health_state))
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
}
