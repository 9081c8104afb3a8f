use chrono::{DateTime, Utc};

use crate::constants::{CONFIDENCE_DECIMALS, UNKNOWN};
use crate::domain::{CleanRecord, RawRecord, RejectReason, RejectRecord, RiskBand};
use crate::pipeline::processing::fields::{round_to, FieldValue};
use crate::pipeline::processing::timestamp;

/// Outcome of the Silver contract for a single raw record
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Clean(CleanRecord),
    Rejected(RejectRecord),
}

impl GateOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, GateOutcome::Clean(_))
    }
}

/// Trait for implementing Silver contract validation
pub trait QualityGate {
    /// Classify a raw record as clean or rejected, stamping `processed_at` as lineage.
    fn assess(&self, raw: &RawRecord, processed_at: DateTime<Utc>) -> GateOutcome;
}

/// The decision-event contract: eight rules evaluated in a fixed order, first failure wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionContractGate;

/// First rule that failed, with the decision id if it had already been extracted
#[derive(Debug, Clone, PartialEq)]
struct RuleViolation {
    reason: RejectReason,
    decision_id: Option<String>,
}

/// Fields that passed every rule, before lineage stamping
struct ValidatedFields {
    decision_id: String,
    decision_type: String,
    model_version: String,
    confidence_score: f64,
    risk_band: RiskBand,
    policy_id: String,
    decision_ts: String,
}

impl DecisionContractGate {
    pub fn new() -> Self {
        Self
    }

    /// Facility is always present downstream; blank becomes `UNKNOWN` and never rejects.
    fn facility_code(raw: &RawRecord) -> String {
        FieldValue::of(raw, "facility_code")
            .to_text()
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn apply_rules(raw: &RawRecord) -> Result<ValidatedFields, RuleViolation> {
        // Band is case-folded up front so mixed-case valid bands pass
        let risk_band = FieldValue::of(raw, "risk_band")
            .to_text()
            .and_then(|s| s.parse::<RiskBand>().ok());

        let decision_id = FieldValue::of(raw, "decision_id").to_text().ok_or(RuleViolation {
            reason: RejectReason::MissingDecisionId,
            decision_id: None,
        })?;

        let violation = |reason| RuleViolation {
            reason,
            decision_id: Some(decision_id.clone()),
        };

        let decision_type = FieldValue::of(raw, "decision_type")
            .to_text()
            .ok_or_else(|| violation(RejectReason::MissingDecisionType))?;

        let model_version = FieldValue::of(raw, "model_version")
            .to_text()
            .ok_or_else(|| violation(RejectReason::MissingModelVersion))?;

        let confidence = FieldValue::of(raw, "confidence_score")
            .to_float()
            .ok_or_else(|| violation(RejectReason::MissingConfidenceScore))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(violation(RejectReason::InvalidConfidenceScore));
        }

        let risk_band = risk_band.ok_or_else(|| violation(RejectReason::InvalidRiskBand))?;

        let policy_id = FieldValue::of(raw, "policy_id")
            .to_text()
            .ok_or_else(|| violation(RejectReason::MissingPolicyId))?;

        let decision_ts = timestamp::normalize(raw.get("decision_ts"))
            .ok_or_else(|| violation(RejectReason::InvalidDecisionTs))?;

        Ok(ValidatedFields {
            decision_id,
            decision_type,
            model_version,
            confidence_score: round_to(confidence, CONFIDENCE_DECIMALS),
            risk_band,
            policy_id,
            decision_ts,
        })
    }
}

impl QualityGate for DecisionContractGate {
    fn assess(&self, raw: &RawRecord, processed_at: DateTime<Utc>) -> GateOutcome {
        let stamped_at = timestamp::format_utc(&processed_at);
        let facility_code = Self::facility_code(raw);

        match Self::apply_rules(raw) {
            Ok(fields) => GateOutcome::Clean(CleanRecord {
                decision_id: fields.decision_id,
                decision_type: fields.decision_type,
                model_version: fields.model_version,
                confidence_score: fields.confidence_score,
                risk_band: fields.risk_band,
                policy_id: fields.policy_id,
                facility_code,
                decision_ts: fields.decision_ts,
                input_features_hash: raw.get("input_features_hash").cloned(),
                override_flag: FieldValue::of(raw, "override_flag").to_flag(),
                override_reason_code: raw.get("override_reason_code").cloned(),
                ingested_at_utc: stamped_at,
            }),
            Err(violation) => {
                // Map<String, Value> always serializes
                let raw_payload = serde_json::to_string(raw).unwrap_or_default();
                GateOutcome::Rejected(RejectRecord::new(
                    violation.reason,
                    stamped_at,
                    violation.decision_id,
                    raw_payload,
                    Some(facility_code),
                ))
            }
        }
    }
}
