use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::constants::{
    GOLD_DECISIONS_CSV, GOLD_DECISIONS_FIELDS, GOLD_DECISIONS_JSONL, GOLD_REJECTS_CSV,
    GOLD_REJECTS_FIELDS, GOLD_REJECTS_JSONL,
};
use crate::infra::gold_output_adapter::DualFormatWriter;
use crate::metrics::CurationMetrics;
use crate::pipeline::ingestion::read_jsonl_objects;
use crate::pipeline::processing::aggregate::{aggregate_decisions, aggregate_rejects};

/// Counts and output locations from one Silver/Rejects -> Gold run
#[derive(Debug, Clone, PartialEq)]
pub struct CurationSummary {
    pub silver_rows_read: usize,
    pub reject_rows_read: usize,
    pub decision_rows: usize,
    pub reject_rows: usize,
    pub unknown_day_rows: u64,
    pub unscored_rows: u64,
    pub outputs: Vec<PathBuf>,
}

/// Use case for rolling the Silver clean and Rejects streams into the daily Gold fact tables
pub struct GoldCurationUseCase {
    decisions_output: DualFormatWriter,
    rejects_output: DualFormatWriter,
}

impl GoldCurationUseCase {
    pub fn new(decisions_output: DualFormatWriter, rejects_output: DualFormatWriter) -> Self {
        Self {
            decisions_output,
            rejects_output,
        }
    }

    /// Standard Gold file names inside `gold_dir`
    pub fn for_gold_dir(gold_dir: &Path) -> Self {
        Self::new(
            DualFormatWriter::new(
                gold_dir.join(GOLD_DECISIONS_CSV),
                gold_dir.join(GOLD_DECISIONS_JSONL),
            ),
            DualFormatWriter::new(
                gold_dir.join(GOLD_REJECTS_CSV),
                gold_dir.join(GOLD_REJECTS_JSONL),
            ),
        )
    }

    /// Recompute both fact tables from scratch. Missing inputs are treated as empty.
    #[instrument(skip_all, fields(run_id = %uuid::Uuid::new_v4(), silver = %silver_path.display()))]
    pub fn run(&self, silver_path: &Path, rejects_path: &Path) -> Result<CurationSummary> {
        let started = Instant::now();

        let silver_rows = read_jsonl_objects(silver_path)?;
        let reject_rows = read_jsonl_objects(rejects_path)?;
        CurationMetrics::record_rows_read(silver_rows.len(), reject_rows.len());
        info!(
            silver_rows = silver_rows.len(),
            reject_rows = reject_rows.len(),
            "Curating Gold aggregates"
        );

        let decisions = aggregate_decisions(&silver_rows);
        let rejects = aggregate_rejects(&reject_rows);

        let unknown_day_rows = decisions.unknown_day_rows + rejects.unknown_day_rows;
        if unknown_day_rows > 0 {
            warn!(rows = unknown_day_rows, "Timestamps bucketed into UNKNOWN_DAY");
            CurationMetrics::record_unknown_day(unknown_day_rows);
        }
        if decisions.unscored_rows > 0 {
            CurationMetrics::record_unscored(decisions.unscored_rows);
        }

        self.decisions_output
            .write_rows(&decisions.rows, &GOLD_DECISIONS_FIELDS)?;
        self.rejects_output.write_rows(&rejects.rows, &GOLD_REJECTS_FIELDS)?;
        CurationMetrics::record_gold_rows(decisions.rows.len(), rejects.rows.len());

        let elapsed = started.elapsed().as_secs_f64();
        CurationMetrics::record_duration(elapsed);
        info!(
            decision_rows = decisions.rows.len(),
            reject_rows = rejects.rows.len(),
            elapsed_secs = elapsed,
            "Silver -> Gold complete"
        );

        Ok(CurationSummary {
            silver_rows_read: silver_rows.len(),
            reject_rows_read: reject_rows.len(),
            decision_rows: decisions.rows.len(),
            reject_rows: rejects.rows.len(),
            unknown_day_rows,
            unscored_rows: decisions.unscored_rows,
            outputs: vec![
                self.decisions_output.csv_path().to_path_buf(),
                self.decisions_output.jsonl_path().to_path_buf(),
                self.rejects_output.csv_path().to_path_buf(),
                self.rejects_output.jsonl_path().to_path_buf(),
            ],
        })
    }
}
