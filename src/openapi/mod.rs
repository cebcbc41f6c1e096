use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Tracker API",
        version = "1.0.0",
        description = r#"
# Asset Tracker API

Registers physical assets against a code registry of locations, sublocations,
categories and subcategories, and tracks them through relocation, maintenance
and disposal.

## Serial numbers

Every asset carries a serial number of the form
`{location}-{category}-{sublocation}-{sequence}`, e.g. `HQ-ELEC-RM1-001`.
The sequence counts assets sharing the same category and subcategory.
Moving an asset to another location rewrites the first three segments and
keeps the sequence; moving within a location keeps the serial unchanged.

## Barcodes

A Code 128 PNG of the serial number is kept per asset at
`GET /api/v1/assets/{id}/barcode`. Barcode writes never roll back the
database change that triggered them; failures are reported in the response
and may be retried with `POST /api/v1/assets/{id}/barcode`.

## Error Handling

```json
{
  "error": "Conflict",
  "message": "Conflict: Serial number HQ-ELEC-RM1-001 is already in use",
  "request_id": "5b0f3c1e-...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
"#,
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "registry", description = "Locations, sublocations, categories and subcategories"),
        (name = "assets", description = "Asset registration, relocation and barcodes"),
        (name = "maintenance", description = "Maintenance scheduling"),
        (name = "disposals", description = "Asset disposal"),
        (name = "reports", description = "Depreciation and disposal reports")
    ),
    paths(
        crate::handlers::registry::list_locations,
        crate::handlers::registry::create_location,
        crate::handlers::registry::get_location,
        crate::handlers::registry::list_sublocations,
        crate::handlers::registry::create_sublocation,
        crate::handlers::registry::list_categories,
        crate::handlers::registry::create_category,
        crate::handlers::registry::get_category,
        crate::handlers::registry::list_subcategories,
        crate::handlers::registry::create_subcategory,

        crate::handlers::assets::list_assets,
        crate::handlers::assets::register_asset,
        crate::handlers::assets::get_asset,
        crate::handlers::assets::get_asset_by_serial,
        crate::handlers::assets::update_asset,
        crate::handlers::assets::move_asset,
        crate::handlers::assets::list_movements,
        crate::handlers::assets::regenerate_barcode,
        crate::handlers::assets::get_barcode,

        crate::handlers::maintenance::schedule_maintenance,
        crate::handlers::maintenance::maintenance_history,

        crate::handlers::disposals::dispose_asset,
        crate::handlers::disposals::list_disposals,

        crate::handlers::reports::depreciation_report,
        crate::handlers::reports::disposal_report,
    ),
    components(
        schemas(
            crate::handlers::registry::LocationSummary,
            crate::handlers::registry::SubLocationSummary,
            crate::handlers::registry::CategorySummary,
            crate::handlers::registry::SubCategorySummary,
            crate::services::registry::CreateCodeRequest,
            crate::services::registry::CreateSubLocationRequest,
            crate::services::registry::CreateSubCategoryRequest,

            crate::handlers::assets::AssetSummary,
            crate::handlers::assets::MovementSummary,
            crate::handlers::assets::RegisterAssetResponse,
            crate::handlers::assets::MoveAssetResponse,
            crate::commands::assets::RegisterAssetCommand,
            crate::commands::assets::UpdateAssetCommand,
            crate::commands::assets::RelocateAssetCommand,
            crate::services::assets::AssetDetail,
            crate::services::assets::RegistryRef,
            crate::barcode::ArtifactReport,

            crate::handlers::maintenance::MaintenanceSummary,
            crate::commands::maintenance::ScheduleMaintenanceCommand,

            crate::handlers::disposals::DisposalSummary,
            crate::handlers::disposals::DisposeAssetResponse,
            crate::commands::disposals::DisposeAssetCommand,

            crate::services::reports::DepreciationLine,
            crate::services::reports::DisposalLine,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_asset_routes() {
        let json = ApiDocV1::openapi().to_json().unwrap();
        assert!(json.contains("Asset Tracker API"));
        assert!(json.contains("/api/v1/assets/{id}/move"));
        assert!(json.contains("/api/v1/sublocations"));
        assert!(json.contains("/api/v1/reports/depreciation"));
    }
}
