//! Curation Phase Metrics
//!
//! Silver/Rejects -> Gold: rows consumed, Gold rows produced, and degraded inputs.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Silver/Rejects -> Gold phase
pub struct CurationMetrics;

impl CurationMetrics {
    pub fn record_rows_read(silver_rows: usize, reject_rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "curation", "silver_rows_read"))
            .increment(silver_rows as u64);
        ::metrics::counter!(phase_metric!(counter, "curation", "reject_rows_read"))
            .increment(reject_rows as u64);
    }

    pub fn record_gold_rows(decision_rows: usize, reject_rows: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "curation", "gold_decision_rows"))
            .set(decision_rows as f64);
        ::metrics::gauge!(phase_metric!(gauge, "curation", "gold_reject_rows"))
            .set(reject_rows as f64);
    }

    pub fn record_unknown_day(rows: u64) {
        ::metrics::counter!(phase_metric!(counter, "curation", "unknown_day_rows")).increment(rows);
    }

    pub fn record_unscored(rows: u64) {
        ::metrics::counter!(phase_metric!(counter, "curation", "unscored_rows")).increment(rows);
    }

    pub fn record_duration(seconds: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "curation", "duration_seconds"))
            .record(seconds);
    }
}

impl PhaseMetrics for CurationMetrics {
    fn register_metrics() {
        use ::metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "curation", "silver_rows_read"));
        let _ = counter!(phase_metric!(counter, "curation", "reject_rows_read"));
        let _ = counter!(phase_metric!(counter, "curation", "unknown_day_rows"));
        let _ = counter!(phase_metric!(counter, "curation", "unscored_rows"));
        let _ = gauge!(phase_metric!(gauge, "curation", "gold_decision_rows"));
        let _ = gauge!(phase_metric!(gauge, "curation", "gold_reject_rows"));
        let _ = histogram!(phase_metric!(histogram, "curation", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "curation"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "curation", "silver_rows_read"),
                metric_type: MetricType::Counter,
                help: "Silver clean rows read for aggregation",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "curation", "reject_rows_read"),
                metric_type: MetricType::Counter,
                help: "Reject rows read for aggregation",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "curation", "unknown_day_rows"),
                metric_type: MetricType::Counter,
                help: "Rows bucketed into UNKNOWN_DAY because their timestamp did not parse",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "curation", "unscored_rows"),
                metric_type: MetricType::Counter,
                help: "Clean rows counted without a numeric confidence_score",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "curation", "gold_decision_rows"),
                metric_type: MetricType::Gauge,
                help: "Rows in the daily decisions fact table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "curation", "gold_reject_rows"),
                metric_type: MetricType::Gauge,
                help: "Rows in the daily rejects fact table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "curation", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a Silver -> Gold run",
                labels: vec![],
            },
        ]
    }
}
