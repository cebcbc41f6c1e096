pub mod assets;
pub mod common;
pub mod disposals;
pub mod maintenance;
pub mod registry;
pub mod reports;

use crate::barcode::BarcodeManager;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    assets::AssetService, disposals::DisposalService, maintenance::MaintenanceService,
    registry::RegistryService, reports::ReportService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub registry: Arc<RegistryService>,
    pub assets: Arc<AssetService>,
    pub maintenance: Arc<MaintenanceService>,
    pub disposals: Arc<DisposalService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        barcodes: BarcodeManager,
    ) -> Self {
        Self {
            registry: Arc::new(RegistryService::new(db_pool.clone(), event_sender.clone())),
            assets: Arc::new(AssetService::new(
                db_pool.clone(),
                event_sender.clone(),
                barcodes,
            )),
            maintenance: Arc::new(MaintenanceService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            disposals: Arc::new(DisposalService::new(db_pool.clone(), event_sender)),
            reports: Arc::new(ReportService::new(db_pool)),
        }
    }
}
