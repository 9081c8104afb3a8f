//! Validation Phase Metrics
//!
//! Landing -> Silver: files and lines read, and how each line was classified.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Landing -> Silver phase
pub struct ValidationMetrics;

impl ValidationMetrics {
    pub fn record_file_read() {
        ::metrics::counter!(phase_metric!(counter, "validation", "files_read")).increment(1);
    }

    pub fn record_line_read() {
        ::metrics::counter!(phase_metric!(counter, "validation", "lines_read")).increment(1);
    }

    pub fn record_clean() {
        ::metrics::counter!(phase_metric!(counter, "validation", "clean_records")).increment(1);
    }

    pub fn record_reject(reason_code: &'static str) {
        ::metrics::counter!(
            phase_metric!(counter, "validation", "rejected_records"),
            "reason_code" => reason_code
        )
        .increment(1);
    }

    pub fn record_duration(seconds: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "validation", "duration_seconds"))
            .record(seconds);
    }
}

impl PhaseMetrics for ValidationMetrics {
    fn register_metrics() {
        use ::metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "validation", "files_read"));
        let _ = counter!(phase_metric!(counter, "validation", "lines_read"));
        let _ = counter!(phase_metric!(counter, "validation", "clean_records"));
        let _ = counter!(phase_metric!(counter, "validation", "rejected_records"));
        let _ = histogram!(phase_metric!(histogram, "validation", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "validation"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "validation", "files_read"),
                metric_type: MetricType::Counter,
                help: "Landing files opened during validation",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "validation", "lines_read"),
                metric_type: MetricType::Counter,
                help: "Non-blank landing lines processed",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "validation", "clean_records"),
                metric_type: MetricType::Counter,
                help: "Records written to the Silver clean stream",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "validation", "rejected_records"),
                metric_type: MetricType::Counter,
                help: "Records written to the Rejects stream",
                labels: vec!["reason_code"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "validation", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a Landing -> Silver run",
                labels: vec![],
            },
        ]
    }
}
