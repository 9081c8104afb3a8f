//! Daily Gold rollups over the Silver clean and Rejects streams.
//!
//! Every call recomputes from scratch; accumulators live only for the duration of the call.

use std::collections::BTreeMap;
use tracing::warn;

use crate::constants::{CONFIDENCE_DECIMALS, UNKNOWN, UNKNOWN_DAY};
use crate::domain::{DailyDecisionAggregate, DailyRejectAggregate, RawRecord};
use crate::pipeline::processing::fields::{round_to, FieldValue};
use crate::pipeline::processing::timestamp;

/// Field order doubles as the Gold sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DecisionKey {
    day: String,
    risk_band: String,
    model_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RejectKey {
    day: String,
    reason_code: String,
}

#[derive(Debug, Default)]
struct ConfidenceAccumulator {
    count: u64,
    sum: f64,
    /// Rows counted without a usable confidence score
    unscored: u64,
}

/// Aggregation output plus the anomalies that were absorbed along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionRollup {
    pub rows: Vec<DailyDecisionAggregate>,
    /// Rows whose `decision_ts` fell into `UNKNOWN_DAY`
    pub unknown_day_rows: u64,
    /// Rows counted but left out of the confidence sum
    pub unscored_rows: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RejectRollup {
    pub rows: Vec<DailyRejectAggregate>,
    pub unknown_day_rows: u64,
}

fn dimension(row: &RawRecord, key: &str) -> String {
    FieldValue::of(row, key)
        .to_text()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Bucket clean records by (day, risk band, model version) and average their confidence.
///
/// A record without a numeric confidence still counts toward `decisions_count` but adds
/// nothing to the sum, so the average is taken over `decisions_count`.
pub fn aggregate_decisions<'a, I>(rows: I) -> DecisionRollup
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut buckets: BTreeMap<DecisionKey, ConfidenceAccumulator> = BTreeMap::new();
    let mut unknown_day_rows = 0;

    for row in rows {
        let day = timestamp::day_bucket(row.get("decision_ts"));
        if day == UNKNOWN_DAY {
            unknown_day_rows += 1;
        }
        let key = DecisionKey {
            day,
            risk_band: dimension(row, "risk_band"),
            model_version: dimension(row, "model_version"),
        };

        let acc = buckets.entry(key).or_default();
        acc.count += 1;
        match FieldValue::of(row, "confidence_score").to_float() {
            Some(score) => acc.sum += score,
            None => acc.unscored += 1,
        }
    }

    let mut unscored_rows = 0;
    let rows = buckets
        .into_iter()
        .map(|(key, acc)| {
            if acc.unscored > 0 {
                warn!(
                    day = %key.day,
                    risk_band = %key.risk_band,
                    model_version = %key.model_version,
                    unscored = acc.unscored,
                    count = acc.count,
                    "Bucket has rows without a numeric confidence_score; average understates"
                );
                unscored_rows += acc.unscored;
            }
            let avg = (acc.count > 0)
                .then(|| round_to(acc.sum / acc.count as f64, CONFIDENCE_DECIMALS));
            DailyDecisionAggregate {
                decision_day: key.day,
                risk_band: key.risk_band,
                model_version: key.model_version,
                decisions_count: acc.count,
                avg_confidence_score: avg,
            }
        })
        .collect();

    DecisionRollup {
        rows,
        unknown_day_rows,
        unscored_rows,
    }
}

/// Count rejects by (day of `rejected_at_utc`, upper-cased reason code).
pub fn aggregate_rejects<'a, I>(rows: I) -> RejectRollup
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut buckets: BTreeMap<RejectKey, u64> = BTreeMap::new();
    let mut unknown_day_rows = 0;

    for row in rows {
        let day = timestamp::day_bucket(row.get("rejected_at_utc"));
        if day == UNKNOWN_DAY {
            unknown_day_rows += 1;
        }
        let key = RejectKey {
            day,
            reason_code: dimension(row, "reject_reason_code").to_uppercase(),
        };
        *buckets.entry(key).or_default() += 1;
    }

    let rows = buckets
        .into_iter()
        .map(|(key, count)| DailyRejectAggregate {
            reject_day: key.day,
            reject_reason_code: key.reason_code,
            rejects_count: count,
        })
        .collect();

    RejectRollup {
        rows,
        unknown_day_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn obj(v: Value) -> RawRecord {
        match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn clean_row(ts: &str, band: &str, model: &str, score: Value) -> RawRecord {
        obj(json!({
            "decision_id": "d",
            "decision_ts": ts,
            "risk_band": band,
            "model_version": model,
            "confidence_score": score,
        }))
    }

    fn reject_row(ts: &str, code: &str) -> RawRecord {
        obj(json!({"rejected_at_utc": ts, "reject_reason_code": code}))
    }

    #[test]
    fn averages_confidence_per_bucket() {
        let rows = vec![
            clean_row("2024-01-01T10:00:00Z", "HIGH", "v1", json!(0.8)),
            clean_row("2024-01-01T22:00:00Z", "HIGH", "v1", json!(0.6)),
        ];
        let rollup = aggregate_decisions(&rows);

        assert_eq!(
            rollup.rows,
            vec![DailyDecisionAggregate {
                decision_day: "2024-01-01".into(),
                risk_band: "HIGH".into(),
                model_version: "v1".into(),
                decisions_count: 2,
                avg_confidence_score: Some(0.7),
            }]
        );
    }

    #[test]
    fn rows_are_sorted_by_key_regardless_of_input_order() {
        let mut rows = vec![
            clean_row("2024-01-02T00:00:00Z", "LOW", "v1", json!(0.5)),
            clean_row("2024-01-01T00:00:00Z", "MEDIUM", "v2", json!(0.5)),
            clean_row("2024-01-01T00:00:00Z", "HIGH", "v9", json!(0.5)),
            clean_row("2024-01-01T00:00:00Z", "HIGH", "v1", json!(0.5)),
        ];
        let forward = aggregate_decisions(&rows);
        rows.reverse();
        let backward = aggregate_decisions(&rows);

        assert_eq!(forward, backward);
        let keys: Vec<(&str, &str, &str)> = forward
            .rows
            .iter()
            .map(|r| (r.decision_day.as_str(), r.risk_band.as_str(), r.model_version.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01", "HIGH", "v1"),
                ("2024-01-01", "HIGH", "v9"),
                ("2024-01-01", "MEDIUM", "v2"),
                ("2024-01-02", "LOW", "v1"),
            ]
        );
    }

    #[test]
    fn unparseable_day_and_blank_dimensions_fall_back_to_sentinels() {
        let rows = vec![clean_row("garbage", "", " ", json!(0.4))];
        let rollup = aggregate_decisions(&rows);

        assert_eq!(rollup.unknown_day_rows, 1);
        assert_eq!(rollup.rows[0].decision_day, "UNKNOWN_DAY");
        assert_eq!(rollup.rows[0].risk_band, "UNKNOWN");
        assert_eq!(rollup.rows[0].model_version, "UNKNOWN");
    }

    #[test]
    fn non_numeric_confidence_counts_but_does_not_sum() {
        let rows = vec![
            clean_row("2024-01-01T00:00:00Z", "LOW", "v1", json!(0.9)),
            clean_row("2024-01-01T00:00:00Z", "LOW", "v1", json!("n/a")),
        ];
        let rollup = aggregate_decisions(&rows);

        assert_eq!(rollup.rows[0].decisions_count, 2);
        assert_eq!(rollup.rows[0].avg_confidence_score, Some(0.45));
        assert_eq!(rollup.unscored_rows, 1);
    }

    #[test]
    fn rejects_are_counted_by_day_and_upper_cased_reason() {
        let rows = vec![
            reject_row("2024-01-01T01:00:00Z", "invalid_json"),
            reject_row("2024-01-01T02:00:00Z", "INVALID_JSON"),
            reject_row("2024-01-01T03:00:00Z", "MISSING_POLICY_ID"),
            obj(json!({"rejected_at_utc": null})),
        ];
        let rollup = aggregate_rejects(&rows);

        assert_eq!(
            rollup.rows,
            vec![
                DailyRejectAggregate {
                    reject_day: "2024-01-01".into(),
                    reject_reason_code: "INVALID_JSON".into(),
                    rejects_count: 2,
                },
                DailyRejectAggregate {
                    reject_day: "2024-01-01".into(),
                    reject_reason_code: "MISSING_POLICY_ID".into(),
                    rejects_count: 1,
                },
                DailyRejectAggregate {
                    reject_day: "UNKNOWN_DAY".into(),
                    reject_reason_code: "UNKNOWN".into(),
                    rejects_count: 1,
                },
            ]
        );
        assert_eq!(rollup.unknown_day_rows, 1);
    }

    #[test]
    fn empty_inputs_produce_empty_rollups() {
        let none: Vec<RawRecord> = Vec::new();
        assert!(aggregate_decisions(&none).rows.is_empty());
        assert!(aggregate_rejects(&none).rows.is_empty());
    }
}
