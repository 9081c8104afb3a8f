//! Run metrics for the medallion pipeline
//!
//! Each pipeline phase defines its own metrics in a dedicated submodule, so names
//! stay consistent and conflicts are caught when the registry runs.

pub mod curation;
pub mod registry;
pub mod validation;

pub use curation::CurationMetrics;
pub use validation::ValidationMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register all phase metrics.
///
/// Idempotent. No HTTP listener is started: a run is short-lived, so metrics are
/// rendered in-process and written out with [`write_snapshot`].
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already stored");
            }
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Render the current metric values in Prometheus text exposition format.
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Write the rendered metrics to `path` (textfile-collector style). No-op without a recorder.
pub fn write_snapshot(path: &Path) -> std::io::Result<bool> {
    let Some(body) = render() else {
        warn!("Metrics recorder not installed; skipping snapshot");
        return Ok(false);
    };
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, body)?;
    info!("Metrics snapshot written to {}", path.display());
    Ok(true)
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following `medallion_{phase}_{name}`, with `_total` for counters.
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("medallion_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("medallion_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("medallion_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_naming_convention() {
        assert_eq!(
            phase_metric!(counter, "validation", "clean_records"),
            "medallion_validation_clean_records_total"
        );
        assert_eq!(
            phase_metric!(histogram, "curation", "duration_seconds"),
            "medallion_curation_duration_seconds"
        );
        assert_eq!(
            phase_metric!(gauge, "curation", "gold_decision_rows"),
            "medallion_curation_gold_decision_rows"
        );
    }

    #[test]
    fn snapshot_without_recorder_is_skipped() {
        // Unit tests never install the global recorder
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.prom");
        if HANDLE.get().is_none() {
            assert!(!write_snapshot(&path).unwrap());
            assert!(!path.exists());
        }
    }
}
