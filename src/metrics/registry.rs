//! Metrics registry for coordinating phase-specific metrics
//!
//! Registers every phase, attaches help text to the recorder, and reports
//! naming conflicts between phases.

use crate::metrics::{MetricDoc, MetricType, PhaseMetrics};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Metric name -> (owning phase, documentation)
type MetricIndex = BTreeMap<&'static str, (&'static str, MetricDoc)>;

/// Register all metrics from all phases
pub fn register_all_metrics() {
    let mut all_metrics = BTreeMap::new();

    register_phase_metrics::<super::validation::ValidationMetrics>(&mut all_metrics);
    register_phase_metrics::<super::curation::CurationMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
}

/// Register metrics for a specific phase and detect conflicts
fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut MetricIndex) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for conflict in merge_phase_docs(all_metrics, phase_name, T::metrics_documentation()) {
        warn!(
            "Metric name conflict detected: '{}' is defined in both '{}' and '{}'",
            conflict.name, conflict.first_phase, phase_name
        );
    }

    for (_, doc) in all_metrics.values().filter(|(phase, _)| *phase == phase_name) {
        describe(doc);
    }
}

#[derive(Debug, PartialEq)]
struct Conflict {
    name: &'static str,
    first_phase: &'static str,
}

fn merge_phase_docs(
    all_metrics: &mut MetricIndex,
    phase_name: &'static str,
    docs: Vec<MetricDoc>,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for doc in docs {
        if let Some((existing_phase, _)) = all_metrics.get(doc.name) {
            conflicts.push(Conflict {
                name: doc.name,
                first_phase: *existing_phase,
            });
        } else {
            all_metrics.insert(doc.name, (phase_name, doc));
        }
    }
    conflicts
}

fn describe(doc: &MetricDoc) {
    debug!(
        "  - {} ({:?}, labels={:?}): {}",
        doc.name, doc.metric_type, doc.labels, doc.help
    );
    match doc.metric_type {
        MetricType::Counter => ::metrics::describe_counter!(doc.name, doc.help),
        MetricType::Histogram => ::metrics::describe_histogram!(doc.name, doc.help),
        MetricType::Gauge => ::metrics::describe_gauge!(doc.name, doc.help),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CurationMetrics, ValidationMetrics};

    #[test]
    fn phases_do_not_collide() {
        let mut all = BTreeMap::new();
        let validation = ValidationMetrics::metrics_documentation();
        let curation = CurationMetrics::metrics_documentation();
        let first = merge_phase_docs(&mut all, "validation", validation);
        let second = merge_phase_docs(&mut all, "curation", curation);

        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(
            all.len(),
            ValidationMetrics::metrics_documentation().len()
                + CurationMetrics::metrics_documentation().len()
        );
    }

    #[test]
    fn duplicate_names_are_reported() {
        let mut all = BTreeMap::new();
        merge_phase_docs(&mut all, "validation", ValidationMetrics::metrics_documentation());
        let docs = ValidationMetrics::metrics_documentation();
        let conflicts = merge_phase_docs(&mut all, "again", docs);

        assert_eq!(conflicts.len(), ValidationMetrics::metrics_documentation().len());
        assert!(conflicts.iter().all(|c| c.first_phase == "validation"));
    }

    #[test]
    fn every_metric_is_prefixed_with_its_phase() {
        for doc in ValidationMetrics::metrics_documentation() {
            assert!(doc.name.starts_with("medallion_validation_"), "{}", doc.name);
        }
        for doc in CurationMetrics::metrics_documentation() {
            assert!(doc.name.starts_with("medallion_curation_"), "{}", doc.name);
        }
    }
}
