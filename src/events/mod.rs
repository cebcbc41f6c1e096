use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

lazy_static! {
    static ref EVENTS_PROCESSED: IntCounterVec = crate::metrics::int_counter_vec(
        "events_processed_total",
        "Domain events drained from the event channel",
        &["event"]
    );
}

/// Handle for publishing domain events onto the in-process channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event for work that has already committed; a closed channel
    /// is logged and otherwise ignored.
    pub async fn send_or_log(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            warn!(event = name, "{}", e);
        }
    }
}

/// Registry tables, as named in events and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    Location,
    SubLocation,
    Category,
    SubCategory,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::Location => "location",
            RegistryKind::SubLocation => "sublocation",
            RegistryKind::Category => "category",
            RegistryKind::SubCategory => "subcategory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    RegistryRecordCreated {
        kind: RegistryKind,
        id: i32,
        code: String,
    },
    AssetRegistered {
        asset_id: i32,
        serial_number: String,
    },
    AssetUpdated(i32),
    AssetRelocated {
        asset_id: i32,
        movement_id: i32,
        from_location_id: i32,
        to_location_id: i32,
    },
    SerialNumberChanged {
        asset_id: i32,
        old_serial: String,
        new_serial: String,
    },
    BarcodeRegenerated {
        asset_id: i32,
        serial_number: String,
    },
    /// A best-effort barcode step failed after its transaction committed.
    BarcodeArtifactFailed {
        asset_id: i32,
        serial_number: String,
        error: String,
    },
    MaintenanceScheduled {
        asset_id: i32,
        maintenance_id: i32,
    },
    AssetDisposed {
        asset_id: i32,
        disposal_id: i32,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RegistryRecordCreated { .. } => "registry_record_created",
            Event::AssetRegistered { .. } => "asset_registered",
            Event::AssetUpdated(_) => "asset_updated",
            Event::AssetRelocated { .. } => "asset_relocated",
            Event::SerialNumberChanged { .. } => "serial_number_changed",
            Event::BarcodeRegenerated { .. } => "barcode_regenerated",
            Event::BarcodeArtifactFailed { .. } => "barcode_artifact_failed",
            Event::MaintenanceScheduled { .. } => "maintenance_scheduled",
            Event::AssetDisposed { .. } => "asset_disposed",
        }
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        EVENTS_PROCESSED.with_label_values(&[event.name()]).inc();

        match &event {
            Event::BarcodeArtifactFailed {
                asset_id,
                serial_number,
                error,
            } => {
                warn!(
                    asset_id,
                    serial_number = %serial_number,
                    error = %error,
                    "Barcode artifact is out of date; regenerate it to repair"
                );
            }
            Event::SerialNumberChanged {
                asset_id,
                old_serial,
                new_serial,
            } => {
                info!(asset_id, old_serial = %old_serial, new_serial = %new_serial, "Serial number changed");
            }
            Event::RegistryRecordCreated { kind, id, code } => {
                info!(kind = kind.as_str(), id, code = %code, "Registry record created");
            }
            other => info!(event = other.name(), "Received event: {:?}", other),
        }
    }

    info!("Event processing loop stopped");
}
