#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use asset_tracker_api::{
    barcode::{ArtifactError, BarcodeGeometry, BarcodeManager, BarcodeStore, InMemoryBarcodeStore},
    commands::assets::RegisterAssetCommand,
    config::AppConfig,
    db::{self, DbConfig},
    errors::ServiceError,
    events::{self, EventSender},
    services::{
        assets::RegisteredAsset,
        registry::{CreateCodeRequest, CreateSubCategoryRequest, CreateSubLocationRequest},
    },
    AppState,
};

/// Barcode store whose every operation fails, for exercising the
/// "database wins" path.
pub struct FailingStore;

#[async_trait]
impl BarcodeStore for FailingStore {
    async fn put(&self, _key: &str, _png: Vec<u8>) -> Result<(), ArtifactError> {
        Err(ArtifactError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }

    async fn remove(&self, _key: &str) -> Result<bool, ArtifactError> {
        Err(ArtifactError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        Err(ArtifactError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }
}

/// Ids of the registry rows created by [`TestApp::seed_registry`].
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    /// HQ
    pub hq: i32,
    /// BR2
    pub br2: i32,
    /// HQ/RM1
    pub rm1: i32,
    /// HQ/RM2
    pub rm2: i32,
    /// BR2/RM5
    pub rm5: i32,
    /// ELEC
    pub elec: i32,
    /// ELEC/LAPTOP
    pub laptop: i32,
    /// ELEC/PHONE
    pub phone: i32,
    /// FURN
    pub furn: i32,
    /// FURN/DESK
    pub desk: i32,
}

/// Application state over a throwaway SQLite file and a pluggable barcode
/// store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub barcode_store: Arc<dyn BarcodeStore>,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryBarcodeStore::new())).await
    }

    pub async fn with_store(barcode_store: Arc<dyn BarcodeStore>) -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}?mode=rwc", db_dir.path().join("assets.db").display());

        let cfg = AppConfig::new(url.clone(), "127.0.0.1".into(), 18_080, "test".into());

        let pool = db::establish_connection_with_config(&DbConfig {
            url,
            max_connections: 4,
            ..Default::default()
        })
        .await
        .expect("test database");
        db::run_migrations(&pool).await.expect("migrations");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let barcodes = BarcodeManager::new(barcode_store.clone(), BarcodeGeometry::default());
        let state = AppState::new(Arc::new(pool), cfg, event_sender, barcodes);
        let router = asset_tracker_api::build_router(state.clone());

        Self {
            router,
            state,
            barcode_store,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    pub async fn seed_registry(&self) -> Registry {
        let registry = self.state.registry_service();

        let entry = |name: &str, code: &str| CreateCodeRequest {
            name: name.into(),
            code: code.into(),
        };
        let hq = registry
            .create_location(entry("Headquarters", "HQ"))
            .await
            .expect("HQ");
        let br2 = registry
            .create_location(entry("Branch 2", "BR2"))
            .await
            .expect("BR2");

        let sub = |name: &str, code: &str, location_id: i32| CreateSubLocationRequest {
            name: name.into(),
            code: code.into(),
            location_id,
        };
        let rm1 = registry
            .create_sublocation(sub("Room 1", "RM1", hq.id))
            .await
            .expect("RM1");
        let rm2 = registry
            .create_sublocation(sub("Room 2", "RM2", hq.id))
            .await
            .expect("RM2");
        let rm5 = registry
            .create_sublocation(sub("Room 5", "RM5", br2.id))
            .await
            .expect("RM5");

        let elec = registry
            .create_category(entry("Electronics", "ELEC"))
            .await
            .expect("ELEC");
        let furn = registry
            .create_category(entry("Furniture", "FURN"))
            .await
            .expect("FURN");

        let subcat = |name: &str, code: &str, category_id: i32| CreateSubCategoryRequest {
            name: name.into(),
            code: code.into(),
            category_id,
        };
        let laptop = registry
            .create_subcategory(subcat("Laptops", "LAPTOP", elec.id))
            .await
            .expect("LAPTOP");
        let phone = registry
            .create_subcategory(subcat("Phones", "PHONE", elec.id))
            .await
            .expect("PHONE");
        let desk = registry
            .create_subcategory(subcat("Desks", "DESK", furn.id))
            .await
            .expect("DESK");

        Registry {
            hq: hq.id,
            br2: br2.id,
            rm1: rm1.id,
            rm2: rm2.id,
            rm5: rm5.id,
            elec: elec.id,
            laptop: laptop.id,
            phone: phone.id,
            furn: furn.id,
            desk: desk.id,
        }
    }

    pub fn asset_command(
        name: &str,
        (category_id, subcategory_id): (i32, i32),
        (location_id, sublocation_id): (i32, i32),
    ) -> RegisterAssetCommand {
        RegisterAssetCommand {
            name: name.into(),
            asset_type: "Equipment".into(),
            category_id,
            subcategory_id,
            location_id,
            sublocation_id,
            status: "Active".into(),
            assigned_to: None,
            depreciation: 0.0,
            purchased_on: NaiveDate::from_ymd_opt(2024, 1, 15).expect("date"),
            purchase_price: None,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        classification: (i32, i32),
        placement: (i32, i32),
    ) -> Result<RegisteredAsset, ServiceError> {
        self.state
            .asset_service()
            .register(Self::asset_command(name, classification, placement))
            .await
    }

    pub async fn has_barcode(&self, serial: &str) -> bool {
        self.barcode_store
            .exists(serial)
            .await
            .expect("barcode store readable")
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("json body"))
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router error during test request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body")
        .to_vec()
}

pub async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json response")
}
