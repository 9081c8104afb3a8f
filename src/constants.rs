/// Default locations for each medallion stage, relative to the working directory.
pub const DEFAULT_LANDING_DIR: &str = "data/landing/decision_events";
pub const DEFAULT_SILVER_OUT: &str = "data/silver/decision_events_clean.jsonl";
pub const DEFAULT_REJECTS_OUT: &str = "data/rejects/decision_events_rejects.jsonl";
pub const DEFAULT_GOLD_DIR: &str = "data/gold";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE_PREFIX: &str = "medallion.log";

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "medallion.toml";

/// Landing files are discovered by this extension.
pub const LANDING_EXTENSION: &str = "jsonl";

// Gold output file names
pub const GOLD_DECISIONS_CSV: &str = "fact_ai_decisions_daily.csv";
pub const GOLD_DECISIONS_JSONL: &str = "fact_ai_decisions_daily.jsonl";
pub const GOLD_REJECTS_CSV: &str = "fact_ai_rejects_daily.csv";
pub const GOLD_REJECTS_JSONL: &str = "fact_ai_rejects_daily.jsonl";

/// Published column contract for the daily decisions fact table.
pub const GOLD_DECISIONS_FIELDS: [&str; 5] = [
    "decision_day",
    "risk_band",
    "model_version",
    "decisions_count",
    "avg_confidence_score",
];

/// Published column contract for the daily rejects fact table.
pub const GOLD_REJECTS_FIELDS: [&str; 3] = ["reject_day", "reject_reason_code", "rejects_count"];

/// Placeholder for blank facility codes and blank aggregation dimensions.
pub const UNKNOWN: &str = "UNKNOWN";

/// Day bucket used when a timestamp cannot be parsed during aggregation.
pub const UNKNOWN_DAY: &str = "UNKNOWN_DAY";

/// Decimal places kept for confidence scores and their averages.
pub const CONFIDENCE_DECIMALS: usize = 4;

// Environment overrides
pub const ENV_LANDING_DIR: &str = "MEDALLION_LANDING_DIR";
pub const ENV_SILVER_OUT: &str = "MEDALLION_SILVER_OUT";
pub const ENV_REJECTS_OUT: &str = "MEDALLION_REJECTS_OUT";
pub const ENV_GOLD_DIR: &str = "MEDALLION_GOLD_DIR";
pub const ENV_LOG_DIR: &str = "MEDALLION_LOG_DIR";
pub const ENV_METRICS_SNAPSHOT: &str = "MEDALLION_METRICS_SNAPSHOT";
