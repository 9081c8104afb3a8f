//! Synthetic landing data: realistic decision events with a controlled share of corrupted ones.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::pipeline::processing::fields::round_to;
use crate::pipeline::processing::timestamp::format_utc;

const DECISION_TYPES: [&str; 4] = [
    "coverage_recommendation",
    "fraud_flag",
    "pricing_adjustment",
    "claim_triage",
];
const MODEL_VERSIONS: [&str; 3] = ["risk-model-v1.2", "risk-model-v1.3", "risk-model-v1.4"];
const RISK_BANDS: [&str; 3] = ["LOW", "MEDIUM", "HIGH"];
const POLICIES: [&str; 5] = ["POL-1001", "POL-1002", "POL-1003", "POL-1004", "POL-2001"];
const FACILITIES: [&str; 4] = ["FAC-001", "FAC-023", "FAC-102", "FAC-210"];
const OVERRIDE_REASONS: [&str; 4] = [
    "HUMAN_REVIEW_REQUIRED",
    "OUT_OF_POLICY",
    "MISSING_EVIDENCE",
    "EXCEPTION_APPROVAL",
];
const BAD_RISK_BANDS: [&str; 5] = ["MID", "UNKNOWN", "low", "HIGHEST", ""];
const BAD_TIMESTAMPS: [Option<&str>; 4] = [Some("not-a-date"), Some("2026-99-99"), Some(""), None];

const OVERRIDE_RATE: f64 = 0.18;
const SPAN_MINUTES: i64 = 60 * 24 * 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corruption {
    DropConfidence,
    EmptyModelVersion,
    InvalidRiskBand,
    MissingPolicyId,
    EmptyFacilityCode,
    BadTimestamp,
}

const CORRUPTIONS: [Corruption; 6] = [
    Corruption::DropConfidence,
    Corruption::EmptyModelVersion,
    Corruption::InvalidRiskBand,
    Corruption::MissingPolicyId,
    Corruption::EmptyFacilityCode,
    Corruption::BadTimestamp,
];

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub count: usize,
    /// Fraction of events to corrupt, in [0, 1]
    pub bad_rate: f64,
    pub out_dir: PathBuf,
    pub seed: Option<u64>,
}

impl SyntheticConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            count: 250,
            bad_rate: 0.12,
            out_dir: out_dir.into(),
            seed: None,
        }
    }
}

pub struct SyntheticGenerator {
    rng: StdRng,
    now: DateTime<Utc>,
}

impl SyntheticGenerator {
    pub fn new(seed: Option<u64>, now: DateTime<Utc>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng, now }
    }

    fn pick(&mut self, choices: &[&'static str]) -> &'static str {
        choices.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn random_token(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .map(|b| (b as char).to_ascii_lowercase())
            .take(len)
            .collect()
    }

    fn random_hash(&mut self, len: usize) -> String {
        const HEX: &[u8] = b"abcdef0123456789";
        (0..len)
            .map(|_| HEX[self.rng.gen_range(0..HEX.len())] as char)
            .collect()
    }

    /// A well-formed event stamped within the last ten days.
    pub fn good_event(&mut self) -> Map<String, Value> {
        let start = self.now - Duration::days(10);
        let decision_ts = start + Duration::minutes(self.rng.gen_range(0..=SPAN_MINUTES));
        let override_flag = self.rng.gen_bool(OVERRIDE_RATE);

        let mut event = Map::new();
        event.insert("decision_id".into(), json!(format!("dec_{}", self.random_token(8))));
        event.insert("decision_type".into(), json!(self.pick(&DECISION_TYPES)));
        event.insert("model_version".into(), json!(self.pick(&MODEL_VERSIONS)));
        event.insert(
            "confidence_score".into(),
            json!(round_to(self.rng.gen_range(0.35..=0.99), 2)),
        );
        event.insert("risk_band".into(), json!(self.pick(&RISK_BANDS)));
        event.insert("policy_id".into(), json!(self.pick(&POLICIES)));
        event.insert("facility_code".into(), json!(self.pick(&FACILITIES)));
        event.insert("decision_ts".into(), json!(format_utc(&decision_ts)));
        event.insert("input_features_hash".into(), json!(self.random_hash(7)));
        event.insert("override_flag".into(), json!(override_flag));
        if override_flag {
            event.insert(
                "override_reason_code".into(),
                json!(self.pick(&OVERRIDE_REASONS)),
            );
        }
        event
    }

    /// Apply one or two realistic defects to an event.
    pub fn corrupt(&mut self, event: &mut Map<String, Value>) {
        let rounds = self.rng.gen_range(1..=2);
        for _ in 0..rounds {
            let corruption = CORRUPTIONS[self.rng.gen_range(0..CORRUPTIONS.len())];
            match corruption {
                Corruption::DropConfidence => {
                    event.remove("confidence_score");
                }
                Corruption::EmptyModelVersion => {
                    let value = if self.rng.gen_bool(0.7) { json!("") } else { Value::Null };
                    event.insert("model_version".into(), value);
                }
                Corruption::InvalidRiskBand => {
                    let band = self.pick(&BAD_RISK_BANDS);
                    event.insert("risk_band".into(), json!(band));
                }
                Corruption::MissingPolicyId => {
                    event.remove("policy_id");
                }
                Corruption::EmptyFacilityCode => {
                    event.insert("facility_code".into(), json!(""));
                }
                Corruption::BadTimestamp => {
                    let ts = BAD_TIMESTAMPS[self.rng.gen_range(0..BAD_TIMESTAMPS.len())];
                    event.insert("decision_ts".into(), ts.map(Value::from).unwrap_or(Value::Null));
                }
            }
        }
    }

    pub fn next_event(&mut self, bad_rate: f64) -> Map<String, Value> {
        let mut event = self.good_event();
        if self.rng.gen_bool(bad_rate) {
            self.corrupt(&mut event);
        }
        event
    }
}

/// Write `config.count` events to a new timestamped file in the landing directory.
pub fn generate(config: &SyntheticConfig, now: DateTime<Utc>) -> Result<PathBuf> {
    if !(0.0..=1.0).contains(&config.bad_rate) {
        return Err(PipelineError::Config(format!(
            "bad rate must be between 0 and 1, got {}",
            config.bad_rate
        )));
    }

    fs::create_dir_all(&config.out_dir)?;
    let file_name = format!("decision_events_synth_{}.jsonl", now.format("%Y%m%d_%H%M%S"));
    let out_path = config.out_dir.join(file_name);

    let mut generator = SyntheticGenerator::new(config.seed, now);
    let mut writer = BufWriter::new(File::create(&out_path)?);
    for _ in 0..config.count {
        let event = generator.next_event(config.bad_rate);
        serde_json::to_writer(&mut writer, &event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        count = config.count,
        bad_rate = config.bad_rate,
        path = %out_path.display(),
        "Wrote synthetic landing events"
    );
    Ok(out_path)
}
