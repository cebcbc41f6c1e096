/*!
 * # Metrics Module
 *
 * Prometheus counters for the asset tracker, exported in text format at
 * `/metrics`. Counters are declared next to the code that increments them
 * and registered here through [`int_counter`] / [`int_counter_vec`].
 */

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

lazy_static! {
    pub static ref REGISTRY: Registry =
        Registry::new_custom(Some("asset_tracker".to_string()), None)
            .expect("metric registry can be created");
}

fn register<C>(collector: C) -> C
where
    C: prometheus::core::Collector + Clone + 'static,
{
    // Double registration only happens when a test binary rebuilds a static
    if let Err(e) = REGISTRY.register(Box::new(collector.clone())) {
        warn!("Metric registration skipped: {}", e);
    }
    collector
}

/// Creates an integer counter and registers it with [`REGISTRY`].
pub fn int_counter(name: &str, help: &str) -> IntCounter {
    register(IntCounter::new(name, help).expect("metric can be created"))
}

/// Creates a labelled integer counter and registers it with [`REGISTRY`].
pub fn int_counter_vec(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    register(IntCounterVec::new(Opts::new(name, help), labels).expect("metric can be created"))
}

/// Prometheus text exposition of every registered metric.
pub async fn metrics_handler() -> Result<String, MetricsError> {
    let families = REGISTRY.gather();
    debug!(families = families.len(), "Exporting metrics");

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buffer)
        .map_err(|e| MetricsError::ExportError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| MetricsError::ExportError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    lazy_static! {
        static ref TEST_COUNTER: IntCounter =
            int_counter("metrics_module_test_total", "Counter used by the metrics tests");
    }

    #[tokio::test]
    async fn registered_counters_are_exported() {
        TEST_COUNTER.inc();
        let text = metrics_handler().await.unwrap();
        assert!(text.contains("asset_tracker_metrics_module_test_total"));
    }
}
