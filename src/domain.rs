//! Record shapes shared across the Landing, Silver and Gold stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One unvalidated landing line, parsed into a JSON object.
pub type RawRecord = Map<String, Value>;

/// Coarse categorical risk level assigned to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW",
            RiskBand::Medium => "MEDIUM",
            RiskBand::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskBand {
    type Err = ();

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(RiskBand::Low),
            "MEDIUM" => Ok(RiskBand::Medium),
            "HIGH" => Ok(RiskBand::High),
            _ => Err(()),
        }
    }
}

/// Why a record did not make it into Silver.
///
/// Variants after `InvalidJson` are listed in the order the contract rules are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    InvalidJson,
    MissingDecisionId,
    MissingDecisionType,
    MissingModelVersion,
    MissingConfidenceScore,
    InvalidConfidenceScore,
    InvalidRiskBand,
    MissingPolicyId,
    InvalidDecisionTs,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::InvalidJson => "INVALID_JSON",
            RejectReason::MissingDecisionId => "MISSING_DECISION_ID",
            RejectReason::MissingDecisionType => "MISSING_DECISION_TYPE",
            RejectReason::MissingModelVersion => "MISSING_MODEL_VERSION",
            RejectReason::MissingConfidenceScore => "MISSING_CONFIDENCE_SCORE",
            RejectReason::InvalidConfidenceScore => "INVALID_CONFIDENCE_SCORE",
            RejectReason::InvalidRiskBand => "INVALID_RISK_BAND",
            RejectReason::MissingPolicyId => "MISSING_POLICY_ID",
            RejectReason::InvalidDecisionTs => "INVALID_DECISION_TS",
        }
    }

    /// Static, human-readable explanation stored alongside the code.
    pub fn detail(&self) -> &'static str {
        match self {
            RejectReason::InvalidJson => "Line is not valid JSON object",
            RejectReason::MissingDecisionId => "decision_id is required",
            RejectReason::MissingDecisionType => "decision_type is required",
            RejectReason::MissingModelVersion => "model_version is required and must be non-empty",
            RejectReason::MissingConfidenceScore => {
                "confidence_score is required and must be numeric"
            }
            RejectReason::InvalidConfidenceScore => "confidence_score must be between 0 and 1",
            RejectReason::InvalidRiskBand => "risk_band must be one of HIGH, LOW, MEDIUM",
            RejectReason::MissingPolicyId => "policy_id is required",
            RejectReason::InvalidDecisionTs => "decision_ts must be ISO parseable",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A decision event that satisfied every Silver contract rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub decision_id: String,
    pub decision_type: String,
    pub model_version: String,
    pub confidence_score: f64,
    pub risk_band: RiskBand,
    pub policy_id: String,
    pub facility_code: String,
    /// Canonical UTC timestamp with a `Z` suffix
    pub decision_ts: String,
    pub input_features_hash: Option<Value>,
    pub override_flag: Option<bool>,
    pub override_reason_code: Option<Value>,
    /// Lineage marker stamped when the record was validated
    pub ingested_at_utc: String,
}

/// A landing line that failed JSON parsing or a contract rule, kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectRecord {
    pub rejected_at_utc: String,
    pub decision_id: Option<String>,
    pub reject_reason_code: RejectReason,
    pub reject_reason_detail: String,
    /// The source object re-serialized, or the raw line when it was not a JSON object
    pub raw_payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_code: Option<String>,
}

impl RejectRecord {
    pub fn new(
        reason: RejectReason,
        rejected_at_utc: String,
        decision_id: Option<String>,
        raw_payload: String,
        facility_code: Option<String>,
    ) -> Self {
        Self {
            rejected_at_utc,
            decision_id,
            reject_reason_code: reason,
            reject_reason_detail: reason.detail().to_string(),
            raw_payload,
            facility_code,
        }
    }
}

/// Gold row: decisions per (day, risk band, model version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDecisionAggregate {
    pub decision_day: String,
    pub risk_band: String,
    pub model_version: String,
    pub decisions_count: u64,
    pub avg_confidence_score: Option<f64>,
}

/// Gold row: rejects per (day, reason code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRejectAggregate {
    pub reject_day: String,
    pub reject_reason_code: String,
    pub rejects_count: u64,
}
