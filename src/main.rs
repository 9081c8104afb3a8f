use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use decision_medallion::app::curate_use_case::{CurationSummary, GoldCurationUseCase};
use decision_medallion::app::validate_use_case::{validate_landing, ValidationReport};
use decision_medallion::config::PipelineConfig;
use decision_medallion::pipeline::ingestion::synthetic::{self, SyntheticConfig};
use decision_medallion::{logging, metrics};

#[derive(Parser)]
#[command(name = "decision-medallion")]
#[command(about = "Validate AI decision events into Silver and curate daily Gold aggregates")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./medallion.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write synthetic decision events into the landing directory
    Generate {
        /// Number of events to generate
        #[arg(long, default_value_t = 250)]
        n: usize,
        /// Fraction of events to corrupt (0..1)
        #[arg(long, default_value_t = 0.12)]
        bad_rate: f64,
        /// Output directory (defaults to the configured landing directory)
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate landing events into Silver clean + Rejects
    Validate {
        #[arg(long)]
        indir: Option<PathBuf>,
        #[arg(long)]
        silver_out: Option<PathBuf>,
        #[arg(long)]
        rejects_out: Option<PathBuf>,
    },
    /// Curate Silver + Rejects into the daily Gold fact tables
    Curate {
        #[arg(long)]
        silver: Option<PathBuf>,
        #[arg(long)]
        rejects: Option<PathBuf>,
        #[arg(long)]
        outdir: Option<PathBuf>,
    },
    /// Run validate then curate with the configured paths
    Run,
}

fn print_validation(report: &ValidationReport) {
    let summary = &report.summary;
    println!("✅ Validated landing events from {} file(s)", summary.files_read);
    println!(
        "   Silver clean written to: {} (rows={})",
        report.silver_out.display(),
        summary.clean_count
    );
    println!(
        "   Rejects written to:      {} (rows={})",
        report.rejects_out.display(),
        summary.reject_count
    );
    for (reason, count) in &summary.rejects_by_reason {
        println!("     - {}: {}", reason, count);
    }
}

fn print_curation(summary: &CurationSummary) {
    println!(
        "🏅 Gold outputs written (silver rows={}, reject rows={}):",
        summary.silver_rows_read, summary.reject_rows_read
    );
    let counts = [
        summary.decision_rows,
        summary.decision_rows,
        summary.reject_rows,
        summary.reject_rows,
    ];
    for (path, rows) in summary.outputs.iter().zip(counts) {
        println!("   - {} (rows={})", path.display(), rows);
    }
    if summary.unknown_day_rows > 0 {
        println!("   ⚠️  {} row(s) bucketed into UNKNOWN_DAY", summary.unknown_day_rows);
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides();

    let _log_guard = logging::init_logging(&config.logging);
    metrics::init_metrics();

    let outcome = match cli.command {
        Commands::Generate {
            n,
            bad_rate,
            outdir,
            seed,
        } => {
            let out_dir = outdir.unwrap_or_else(|| config.paths.landing_dir.clone());
            let synth = SyntheticConfig {
                count: n,
                bad_rate,
                out_dir,
                seed,
            };
            synthetic::generate(&synth, Utc::now())
                .map(|path| println!("📝 Wrote synthetic events to: {}", path.display()))
                .map_err(anyhow::Error::from)
        }
        Commands::Validate {
            indir,
            silver_out,
            rejects_out,
        } => {
            if let Some(v) = indir {
                config.paths.landing_dir = v;
            }
            if let Some(v) = silver_out {
                config.paths.silver_out = v;
            }
            if let Some(v) = rejects_out {
                config.paths.rejects_out = v;
            }
            validate_landing(&config.paths).map(|report| print_validation(&report))
        }
        Commands::Curate {
            silver,
            rejects,
            outdir,
        } => {
            if let Some(v) = silver {
                config.paths.silver_out = v;
            }
            if let Some(v) = rejects {
                config.paths.rejects_out = v;
            }
            if let Some(v) = outdir {
                config.paths.gold_dir = v;
            }
            GoldCurationUseCase::for_gold_dir(&config.paths.gold_dir)
                .run(&config.paths.silver_out, &config.paths.rejects_out)
                .map(|summary| print_curation(&summary))
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (validate + curate)...");
            validate_landing(&config.paths).and_then(|report| {
                print_validation(&report);
                let summary = GoldCurationUseCase::for_gold_dir(&config.paths.gold_dir)
                    .run(&config.paths.silver_out, &config.paths.rejects_out)?;
                print_curation(&summary);
                Ok(())
            })
        }
    };

    if let Some(path) = &config.metrics.snapshot_path {
        if let Err(e) = metrics::write_snapshot(path) {
            error!("Failed to write metrics snapshot: {}", e);
        }
    }

    match &outcome {
        Ok(()) => info!("Run finished"),
        Err(e) => error!("Run failed: {:#}", e),
    }
    outcome
}
