use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{PipelineError, Result};

/// Full runtime configuration, layered as defaults -> TOML file -> environment -> CLI flags.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for landing `*.jsonl` files
    pub landing_dir: PathBuf,
    /// Silver clean stream
    pub silver_out: PathBuf,
    /// Rejects stream
    pub rejects_out: PathBuf,
    /// Directory receiving the Gold fact tables
    pub gold_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            landing_dir: PathBuf::from(constants::DEFAULT_LANDING_DIR),
            silver_out: PathBuf::from(constants::DEFAULT_SILVER_OUT),
            rejects_out: PathBuf::from(constants::DEFAULT_REJECTS_OUT),
            gold_dir: PathBuf::from(constants::DEFAULT_GOLD_DIR),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
    /// Filter used when RUST_LOG is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
            file_prefix: constants::DEFAULT_LOG_FILE_PREFIX.to_string(),
            default_filter: "decision_medallion=info,warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Where to write the Prometheus text snapshot at the end of a run
    pub snapshot_path: Option<PathBuf>,
}

impl PipelineConfig {
    /// Load configuration from an explicit file, or from `medallion.toml` if present.
    ///
    /// An explicit path that does not exist is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `MEDALLION_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using an arbitrary variable lookup. Blank values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        if let Some(v) = get(constants::ENV_LANDING_DIR) {
            self.paths.landing_dir = v;
        }
        if let Some(v) = get(constants::ENV_SILVER_OUT) {
            self.paths.silver_out = v;
        }
        if let Some(v) = get(constants::ENV_REJECTS_OUT) {
            self.paths.rejects_out = v;
        }
        if let Some(v) = get(constants::ENV_GOLD_DIR) {
            self.paths.gold_dir = v;
        }
        if let Some(v) = get(constants::ENV_LOG_DIR) {
            self.logging.dir = v;
        }
        if let Some(v) = get(constants::ENV_METRICS_SNAPSHOT) {
            self.metrics.snapshot_path = Some(v);
        }
    }
}
