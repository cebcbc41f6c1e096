//! Barcode artifacts: Code 128 PNG images stored under the serial number
//! they encode.
//!
//! The asset row is authoritative and the image is derived from it, so the
//! best-effort entry points ([`BarcodeManager::ensure`], [`BarcodeManager::swap`])
//! log and count failures instead of returning them.

pub mod code128;
pub mod render;
pub mod store;

pub use store::{BarcodeStore, FsBarcodeStore, InMemoryBarcodeStore};

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

lazy_static! {
    static ref BARCODES_WRITTEN: IntCounter = crate::metrics::int_counter(
        "barcodes_written_total",
        "Total number of barcode images written"
    );
    static ref BARCODES_RETIRED: IntCounter = crate::metrics::int_counter(
        "barcodes_retired_total",
        "Total number of barcode images removed"
    );
    static ref BARCODE_FAILURES: IntCounterVec = crate::metrics::int_counter_vec(
        "barcode_failures_total",
        "Barcode operations that failed and were skipped",
        &["operation"]
    );
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Invalid artifact key: {0:?}")]
    InvalidKey(String),
    #[error("Nothing to encode")]
    EmptyPayload,
    #[error("Character {ch:?} at position {position} is not encodable in Code 128 set B")]
    UnsupportedCharacter { ch: char, position: usize },
    #[error("Image encoding failed: {0}")]
    Encode(String),
    #[error("Artifact storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Image dimensions, in pixels per module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeGeometry {
    pub module_width: u32,
    pub height: u32,
    /// Blank modules on each side.
    pub quiet_zone: u32,
}

impl Default for BarcodeGeometry {
    fn default() -> Self {
        Self {
            module_width: 2,
            height: 80,
            quiet_zone: 10,
        }
    }
}

/// What happened to the artifacts during a best-effort step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactReport {
    /// Serial the fresh image was written under, if the write succeeded.
    pub written: Option<String>,
    /// Whether an image under the previous serial was deleted.
    pub retired: bool,
    /// Failures that were logged and skipped.
    pub errors: Vec<String>,
}

impl ArtifactReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone)]
pub struct BarcodeManager {
    store: Arc<dyn BarcodeStore>,
    geometry: BarcodeGeometry,
}

impl std::fmt::Debug for BarcodeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeManager")
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl BarcodeManager {
    pub fn new(store: Arc<dyn BarcodeStore>, geometry: BarcodeGeometry) -> Self {
        Self { store, geometry }
    }

    pub fn store(&self) -> &Arc<dyn BarcodeStore> {
        &self.store
    }

    /// PNG bytes encoding exactly `serial`.
    pub fn render(&self, serial: &str) -> Result<Vec<u8>, ArtifactError> {
        store::validate_key(serial)?;
        let modules = code128::encode(serial)?;
        let img = render::rasterize(&modules, &self.geometry)?;
        render::encode_png(&img)
    }

    /// Renders and stores the artifact for `serial`, replacing any existing one.
    #[instrument(skip(self))]
    pub async fn publish(&self, serial: &str) -> Result<(), ArtifactError> {
        let png = self.render(serial)?;
        self.store.put(serial, png).await?;
        BARCODES_WRITTEN.inc();
        Ok(())
    }

    /// Deletes the artifact for `serial`. Returns whether one existed.
    #[instrument(skip(self))]
    pub async fn retire(&self, serial: &str) -> Result<bool, ArtifactError> {
        let removed = self.store.remove(serial).await?;
        if removed {
            BARCODES_RETIRED.inc();
        }
        Ok(removed)
    }

    pub async fn fetch(&self, serial: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        self.store.get(serial).await
    }

    pub async fn exists(&self, serial: &str) -> Result<bool, ArtifactError> {
        self.store.exists(serial).await
    }

    /// Best-effort [`publish`](Self::publish).
    pub async fn ensure(&self, serial: &str) -> ArtifactReport {
        let mut report = ArtifactReport::default();
        match self.publish(serial).await {
            Ok(()) => report.written = Some(serial.to_string()),
            Err(e) => record_failure(&mut report, "publish", serial, e),
        }
        report
    }

    /// Best-effort replacement of the artifact for `old` by one for `new`.
    /// The old image is removed first; a failure there does not stop the
    /// new one from being written.
    pub async fn swap(&self, old: &str, new: &str) -> ArtifactReport {
        let mut report = ArtifactReport::default();

        if old != new {
            match self.retire(old).await {
                Ok(removed) => report.retired = removed,
                Err(e) => record_failure(&mut report, "retire", old, e),
            }
        }

        match self.publish(new).await {
            Ok(()) => report.written = Some(new.to_string()),
            Err(e) => record_failure(&mut report, "publish", new, e),
        }

        if report.is_clean() {
            info!(old_serial = %old, new_serial = %new, "Barcode swapped");
        }
        report
    }
}

fn record_failure(report: &mut ArtifactReport, operation: &str, serial: &str, err: ArtifactError) {
    BARCODE_FAILURES.with_label_values(&[operation]).inc();
    warn!(operation, serial = %serial, error = %err, "Barcode operation failed; continuing");
    report.errors.push(format!("{} {}: {}", operation, serial, err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl BarcodeStore for BrokenStore {
        async fn put(&self, _key: &str, _png: Vec<u8>) -> Result<(), ArtifactError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
        async fn remove(&self, _key: &str) -> Result<bool, ArtifactError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
            Ok(None)
        }
    }

    fn manager(store: Arc<dyn BarcodeStore>) -> BarcodeManager {
        BarcodeManager::new(store, BarcodeGeometry::default())
    }

    #[test]
    fn render_produces_png_sized_by_geometry() {
        let manager = manager(Arc::new(InMemoryBarcodeStore::new()));
        let png = manager.render("HQ-ELEC-RM1-001").unwrap();

        let img = image::load_from_memory(&png).unwrap();
        let modules = code128::SYMBOL_MODULES * (15 + 2) + code128::STOP_MODULES;
        assert_eq!(img.width() as usize, (modules + 20) * 2);
        assert_eq!(img.height(), 80);
    }

    #[test]
    fn render_rejects_path_like_serials() {
        let manager = manager(Arc::new(InMemoryBarcodeStore::new()));
        assert!(matches!(
            manager.render("../x"),
            Err(ArtifactError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn swap_moves_artifact_to_new_serial() {
        let store = Arc::new(InMemoryBarcodeStore::new());
        let manager = manager(store.clone());
        manager.publish("HQ-ELEC-RM1-001").await.unwrap();

        let report = manager.swap("HQ-ELEC-RM1-001", "BR2-ELEC-RM5-001").await;

        assert!(report.is_clean());
        assert!(report.retired);
        assert_eq!(report.written.as_deref(), Some("BR2-ELEC-RM5-001"));
        assert_eq!(store.keys(), vec!["BR2-ELEC-RM5-001".to_string()]);
    }

    #[tokio::test]
    async fn swap_tolerates_missing_old_artifact() {
        let store = Arc::new(InMemoryBarcodeStore::new());
        let report = manager(store.clone()).swap("GONE-1", "NEW-1").await;
        assert!(report.is_clean());
        assert!(!report.retired);
        assert!(store.exists("NEW-1").await.unwrap());
    }

    #[tokio::test]
    async fn failures_are_reported_not_raised() {
        let report = manager(Arc::new(BrokenStore)).swap("A-B-C-001", "D-B-E-001").await;
        assert_eq!(report.errors.len(), 2);
        assert!(report.written.is_none());

        let report = manager(Arc::new(BrokenStore)).ensure("A-B-C-001").await;
        assert_eq!(report.errors.len(), 1);
    }
}
