/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - cached up/down status
 * - Readiness check (`/health/ready`) - re-checks the database and barcode store
 * - Liveness check (`/health/live`) - process is alive
 * - Version (`/health/version`)
 */

use crate::{barcode::BarcodeManager, db::DbPool};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Key looked up to check the barcode store; never written.
const CHECK_KEY: &str = "health-check";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Up | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: BTreeMap<String, HealthDetail>,
}

#[derive(Clone)]
pub struct HealthState {
    db_pool: Arc<DbPool>,
    barcodes: BarcodeManager,
    health_cache: Arc<RwLock<HealthInfo>>,
    start_time: SystemTime,
}

impl HealthState {
    pub fn new(db_pool: Arc<DbPool>, barcodes: BarcodeManager) -> Self {
        Self {
            db_pool,
            barcodes,
            health_cache: Arc::new(RwLock::new(HealthInfo {
                status: HealthStatus::Up,
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
                uptime_seconds: 0,
                details: BTreeMap::new(),
            })),
            start_time: SystemTime::now(),
        }
    }

    pub fn uptime(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    }

    /// Re-runs every component check and recomputes the overall status.
    ///
    /// A database failure takes the service down; a barcode store failure
    /// only degrades it, since asset writes still commit without artifacts.
    pub async fn update_health(&self) -> HealthInfo {
        let database = match crate::db::check_connection(&self.db_pool).await {
            Ok(()) => HealthDetail {
                status: HealthStatus::Up,
                message: None,
                timestamp: Utc::now(),
            },
            Err(e) => HealthDetail {
                status: HealthStatus::Down,
                message: Some(e.to_string()),
                timestamp: Utc::now(),
            },
        };

        let barcode_store = match self.barcodes.exists(CHECK_KEY).await {
            Ok(_) => HealthDetail {
                status: HealthStatus::Up,
                message: None,
                timestamp: Utc::now(),
            },
            Err(e) => {
                warn!(error = %e, "Barcode store check failed");
                HealthDetail {
                    status: HealthStatus::Degraded,
                    message: Some(e.to_string()),
                    timestamp: Utc::now(),
                }
            }
        };

        let mut health = self.health_cache.write().await;
        health.timestamp = Utc::now();
        health.uptime_seconds = self.uptime();
        health.details.insert("database".to_string(), database);
        health
            .details
            .insert("barcode_store".to_string(), barcode_store);
        health.status = overall_status(health.details.values().map(|d| d.status));
        health.clone()
    }
}

fn overall_status(statuses: impl Iterator<Item = HealthStatus>) -> HealthStatus {
    statuses.fold(HealthStatus::Up, |acc, status| match (acc, status) {
        (HealthStatus::Down, _) | (_, HealthStatus::Down) => HealthStatus::Down,
        (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
        _ => HealthStatus::Up,
    })
}

pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");
    let health = state.health_cache.read().await;

    (
        health.status.status_code(),
        Json(json!({
            "status": health.status,
            "version": health.version,
            "timestamp": health.timestamp,
        })),
    )
}

pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let health = state.update_health().await;
    (health.status.status_code(), Json(health))
}

pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "alive": true,
            "uptime_seconds": state.uptime(),
        })),
    )
}

/// Refreshes the cached status every `period`.
pub async fn run_health_checker(state: Arc<HealthState>, period: Duration) {
    info!(?period, "Starting periodic health checker");
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;
        let health = state.update_health().await;
        if health.status != HealthStatus::Up {
            for (name, detail) in &health.details {
                if detail.status == HealthStatus::Down {
                    error!(component = %name, "Component is down");
                } else if detail.status != HealthStatus::Up {
                    warn!(component = %name, status = ?detail.status, "Component is not healthy");
                }
            }
        }
    }
}

pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_outranks_degraded() {
        use HealthStatus::*;
        assert_eq!(overall_status([Up, Up].into_iter()), Up);
        assert_eq!(overall_status([Up, Degraded].into_iter()), Degraded);
        assert_eq!(overall_status([Degraded, Down, Up].into_iter()), Down);
        assert_eq!(overall_status(std::iter::empty()), Up);
    }

    #[test]
    fn degraded_still_serves_traffic() {
        assert_eq!(HealthStatus::Degraded.status_code(), StatusCode::OK);
        assert_eq!(
            HealthStatus::Down.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
