use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::app::ports::RecordSink;
use crate::config::PathsConfig;
use crate::domain::{CleanRecord, RejectReason, RejectRecord};
use crate::error::PipelineError;
use crate::infra::ndjson_output_adapter::NdjsonFileSink;
use crate::metrics::ValidationMetrics;
use crate::pipeline::ingestion::{self, JsonlLines};
use crate::pipeline::processing::quality_gate::{DecisionContractGate, GateOutcome, QualityGate};
use crate::pipeline::processing::timestamp;

/// Counts from one Landing -> Silver run. `clean_count + reject_count == lines_read`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub files_read: usize,
    /// Non-blank lines across all files
    pub lines_read: usize,
    pub clean_count: usize,
    pub reject_count: usize,
    pub rejects_by_reason: BTreeMap<RejectReason, usize>,
}

impl ValidationSummary {
    fn record_reject(&mut self, reason: RejectReason) {
        self.reject_count += 1;
        *self.rejects_by_reason.entry(reason).or_default() += 1;
        ValidationMetrics::record_reject(reason.code());
    }
}

/// Use case for partitioning landing lines into the Silver clean and Rejects streams
pub struct SilverValidationUseCase {
    quality_gate: Box<dyn QualityGate>,
    clean_output: Box<dyn RecordSink<CleanRecord>>,
    reject_output: Box<dyn RecordSink<RejectRecord>>,
}

impl SilverValidationUseCase {
    pub fn new(
        quality_gate: Box<dyn QualityGate>,
        clean_output: Box<dyn RecordSink<CleanRecord>>,
        reject_output: Box<dyn RecordSink<RejectRecord>>,
    ) -> Self {
        Self {
            quality_gate,
            clean_output,
            reject_output,
        }
    }

    /// Create a use case with the decision-event contract
    pub fn with_default_quality_gate(
        clean_output: Box<dyn RecordSink<CleanRecord>>,
        reject_output: Box<dyn RecordSink<RejectRecord>>,
    ) -> Self {
        Self::new(Box::new(DecisionContractGate::new()), clean_output, reject_output)
    }

    /// Classify one landing line. Blank lines are ignored and not counted.
    pub fn process_line(&mut self, line: &str, summary: &mut ValidationSummary) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        summary.lines_read += 1;
        ValidationMetrics::record_line_read();

        let processed_at = Utc::now();
        let raw = match ingestion::parse_object_line(line) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Line is not a JSON object: {:?}", e);
                let reject = RejectRecord::new(
                    RejectReason::InvalidJson,
                    timestamp::format_utc(&processed_at),
                    None,
                    line.to_string(),
                    None,
                );
                self.reject_output.write_record(&reject)?;
                summary.record_reject(RejectReason::InvalidJson);
                return Ok(());
            }
        };

        match self.quality_gate.assess(&raw, processed_at) {
            GateOutcome::Clean(record) => {
                self.clean_output.write_record(&record)?;
                summary.clean_count += 1;
                ValidationMetrics::record_clean();
            }
            GateOutcome::Rejected(reject) => {
                debug!(
                    decision_id = ?reject.decision_id,
                    reason = %reject.reject_reason_code,
                    "Record rejected"
                );
                self.reject_output.write_record(&reject)?;
                summary.record_reject(reject.reject_reason_code);
            }
        }
        Ok(())
    }

    /// Process every line of every file, files in path order.
    pub fn run(&mut self, files: &[PathBuf]) -> Result<ValidationSummary> {
        let mut ordered: Vec<&PathBuf> = files.iter().collect();
        ordered.sort();

        let mut summary = ValidationSummary::default();
        for path in ordered {
            debug!("Reading landing file {}", path.display());
            for line in JsonlLines::open(path)? {
                self.process_line(&line?, &mut summary)?;
            }
            summary.files_read += 1;
            ValidationMetrics::record_file_read();
        }

        self.clean_output.flush()?;
        self.reject_output.flush()?;
        Ok(summary)
    }
}

/// Outcome of [`validate_landing`]: counts plus where things were read from and written to.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    pub input_files: Vec<PathBuf>,
    pub silver_out: PathBuf,
    pub rejects_out: PathBuf,
}

/// Landing -> Silver over the configured directories.
///
/// Fails before touching any output if the landing directory has no `*.jsonl` files.
#[instrument(
    skip_all,
    fields(run_id = %uuid::Uuid::new_v4(), landing = %paths.landing_dir.display())
)]
pub fn validate_landing(paths: &PathsConfig) -> Result<ValidationReport> {
    let started = Instant::now();

    let files = ingestion::discover_landing_files(&paths.landing_dir)?;
    if files.is_empty() {
        return Err(no_input_files(&paths.landing_dir).into());
    }
    info!("Validating {} landing file(s)", files.len());

    let clean_sink = NdjsonFileSink::create(&paths.silver_out)?;
    let reject_sink = NdjsonFileSink::create(&paths.rejects_out)?;
    let mut use_case = SilverValidationUseCase::with_default_quality_gate(
        Box::new(clean_sink),
        Box::new(reject_sink),
    );

    let summary = use_case.run(&files)?;

    let elapsed = started.elapsed().as_secs_f64();
    ValidationMetrics::record_duration(elapsed);
    info!(
        files = summary.files_read,
        lines = summary.lines_read,
        clean = summary.clean_count,
        rejects = summary.reject_count,
        elapsed_secs = elapsed,
        "Landing -> Silver complete"
    );

    Ok(ValidationReport {
        summary,
        input_files: files,
        silver_out: paths.silver_out.clone(),
        rejects_out: paths.rejects_out.clone(),
    })
}

fn no_input_files(dir: &Path) -> PipelineError {
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    PipelineError::NoInputFiles { dir }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::storage::InMemorySink;
    use serde_json::json;

    fn use_case() -> (
        SilverValidationUseCase,
        InMemorySink<CleanRecord>,
        InMemorySink<RejectRecord>,
    ) {
        let clean = InMemorySink::new();
        let rejects = InMemorySink::new();
        let uc = SilverValidationUseCase::with_default_quality_gate(
            Box::new(clean.clone()),
            Box::new(rejects.clone()),
        );
        (uc, clean, rejects)
    }

    fn good_line(id: &str) -> String {
        json!({
            "decision_id": id,
            "decision_type": "claim_triage",
            "model_version": "risk-model-v1.3",
            "confidence_score": 0.66,
            "risk_band": "medium",
            "policy_id": "POL-1002",
            "decision_ts": "2024-02-01T08:00:00Z"
        })
        .to_string()
    }

    #[test]
    fn blank_lines_are_skipped_and_not_counted() {
        let (mut uc, clean, rejects) = use_case();
        let mut summary = ValidationSummary::default();

        uc.process_line("", &mut summary).unwrap();
        uc.process_line("   \t", &mut summary).unwrap();

        assert_eq!(summary, ValidationSummary::default());
        assert!(clean.is_empty());
        assert!(rejects.is_empty());
    }

    #[test]
    fn malformed_and_non_object_lines_become_invalid_json_rejects() {
        let (mut uc, clean, rejects) = use_case();
        let mut summary = ValidationSummary::default();

        for line in ["{\"decision_id\": ", "[1, 2, 3]", "\"just a string\"", "  42  "] {
            uc.process_line(line, &mut summary).unwrap();
        }

        assert!(clean.is_empty());
        let rejects = rejects.records();
        assert_eq!(rejects.len(), 4);
        assert!(rejects.iter().all(|r| r.reject_reason_code == RejectReason::InvalidJson));
        assert!(rejects.iter().all(|r| r.facility_code.is_none() && r.decision_id.is_none()));
        assert_eq!(rejects[1].raw_payload, "[1, 2, 3]");
        assert_eq!(rejects[3].raw_payload, "42");
        assert_eq!(summary.rejects_by_reason.get(&RejectReason::InvalidJson), Some(&4));
    }

    #[test]
    fn valid_lines_route_by_gate_outcome() {
        let (mut uc, clean, rejects) = use_case();
        let mut summary = ValidationSummary::default();

        uc.process_line(&good_line("dec_1"), &mut summary).unwrap();
        uc.process_line(r#"{"decision_type":"fraud_flag"}"#, &mut summary).unwrap();

        assert_eq!(summary.lines_read, 2);
        assert_eq!(summary.clean_count, 1);
        assert_eq!(summary.reject_count, 1);
        assert_eq!(clean.records()[0].decision_id, "dec_1");
        let reject = &rejects.records()[0];
        assert_eq!(reject.reject_reason_code, RejectReason::MissingDecisionId);
        assert_eq!(reject.facility_code.as_deref(), Some("UNKNOWN"));
    }

    #[test]
    fn files_are_processed_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = dir.path().join("b.jsonl");
        let a = dir.path().join("a.jsonl");
        std::fs::write(&b, format!("{}\n", good_line("from_b"))).unwrap();
        let a_lines = format!("{}\n\n{}\n", good_line("from_a1"), good_line("from_a2"));
        std::fs::write(&a, a_lines).unwrap();

        let (mut uc, clean, _) = use_case();
        let summary = uc.run(&[b, a]).unwrap();

        let ids: Vec<String> = clean.records().into_iter().map(|r| r.decision_id).collect();
        assert_eq!(ids, vec!["from_a1", "from_a2", "from_b"]);
        assert_eq!(summary.files_read, 2);
        assert_eq!(summary.lines_read, 3);
    }
}
