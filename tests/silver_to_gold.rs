use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use decision_medallion::app::curate_use_case::GoldCurationUseCase;
use decision_medallion::constants::{
    GOLD_DECISIONS_CSV, GOLD_DECISIONS_JSONL, GOLD_REJECTS_CSV, GOLD_REJECTS_JSONL,
};

fn write_jsonl(path: &Path, rows: &[Value]) {
    let body: String = rows.iter().map(|r| format!("{}\n", r)).collect();
    fs::write(path, body).unwrap();
}

fn silver_row(id: &str, ts: &str, band: &str, model: &str, score: f64) -> Value {
    json!({
        "decision_id": id,
        "decision_type": "claim_triage",
        "model_version": model,
        "confidence_score": score,
        "risk_band": band,
        "policy_id": "POL-1001",
        "facility_code": "FAC-EAST-01",
        "decision_ts": ts,
        "input_features_hash": null,
        "override_flag": null,
        "override_reason_code": null,
        "ingested_at_utc": "2024-01-03T00:00:00Z"
    })
}

fn reject_row(ts: &str, code: &str) -> Value {
    json!({
        "rejected_at_utc": ts,
        "decision_id": null,
        "reject_reason_code": code,
        "reject_reason_detail": "detail",
        "raw_payload": "{}"
    })
}

fn gold_files(dir: &Path) -> Vec<String> {
    [GOLD_DECISIONS_CSV, GOLD_DECISIONS_JSONL, GOLD_REJECTS_CSV, GOLD_REJECTS_JSONL]
        .iter()
        .map(|name| fs::read_to_string(dir.join(name)).unwrap())
        .collect()
}

#[test]
fn decisions_are_rolled_up_per_day_band_and_model() -> Result<()> {
    let dir = tempdir()?;
    let silver = dir.path().join("clean.jsonl");
    let rejects = dir.path().join("rejects.jsonl");
    let gold = dir.path().join("gold");

    write_jsonl(
        &silver,
        &[
            silver_row("d1", "2024-01-01T10:00:00Z", "HIGH", "v1", 0.8),
            silver_row("d2", "2024-01-01T22:30:00Z", "HIGH", "v1", 0.6),
            silver_row("d3", "2024-01-02T01:00:00Z", "LOW", "v2", 0.25),
        ],
    );
    write_jsonl(
        &rejects,
        &[
            reject_row("2024-01-01T09:00:00Z", "missing_policy_id"),
            reject_row("2024-01-01T09:05:00Z", "MISSING_POLICY_ID"),
            reject_row("garbage", "INVALID_JSON"),
        ],
    );

    let summary = GoldCurationUseCase::for_gold_dir(&gold).run(&silver, &rejects)?;
    assert_eq!(summary.silver_rows_read, 3);
    assert_eq!(summary.decision_rows, 2);
    assert_eq!(summary.reject_rows, 2);
    assert_eq!(summary.unknown_day_rows, 1);

    let decisions_csv = fs::read_to_string(gold.join(GOLD_DECISIONS_CSV))?;
    assert_eq!(
        decisions_csv,
        "decision_day,risk_band,model_version,decisions_count,avg_confidence_score\r\n\
         2024-01-01,HIGH,v1,2,0.7\r\n\
         2024-01-02,LOW,v2,1,0.25\r\n"
    );

    let first: Value = serde_json::from_str(
        fs::read_to_string(gold.join(GOLD_DECISIONS_JSONL))?
            .lines()
            .next()
            .unwrap(),
    )?;
    assert_eq!(first["decisions_count"], json!(2));
    assert_eq!(first["avg_confidence_score"], json!(0.7));

    let rejects_csv = fs::read_to_string(gold.join(GOLD_REJECTS_CSV))?;
    assert_eq!(
        rejects_csv,
        "reject_day,reject_reason_code,rejects_count\r\n\
         2024-01-01,MISSING_POLICY_ID,2\r\n\
         UNKNOWN_DAY,INVALID_JSON,1\r\n"
    );
    Ok(())
}

#[test]
fn input_order_does_not_change_gold_output() -> Result<()> {
    let dir = tempdir()?;
    let rows = vec![
        silver_row("d1", "2024-03-01T10:00:00Z", "HIGH", "v1", 0.9),
        silver_row("d2", "2024-03-02T10:00:00Z", "MEDIUM", "v1", 0.5),
        silver_row("d3", "2024-03-01T11:00:00Z", "LOW", "v2", 0.1),
        silver_row("d4", "2024-03-01T12:00:00Z", "HIGH", "v1", 0.7),
    ];
    let rejects = vec![
        reject_row("2024-03-01T00:00:00Z", "INVALID_RISK_BAND"),
        reject_row("2024-03-02T00:00:00Z", "INVALID_JSON"),
    ];

    let forward = dir.path().join("forward");
    let reversed = dir.path().join("reversed");
    for (root, reverse) in [(&forward, false), (&reversed, true)] {
        fs::create_dir_all(root)?;
        let mut silver_rows = rows.clone();
        let mut reject_rows = rejects.clone();
        if reverse {
            silver_rows.reverse();
            reject_rows.reverse();
        }
        write_jsonl(&root.join("clean.jsonl"), &silver_rows);
        write_jsonl(&root.join("rejects.jsonl"), &reject_rows);
        GoldCurationUseCase::for_gold_dir(&root.join("gold"))
            .run(&root.join("clean.jsonl"), &root.join("rejects.jsonl"))?;
    }

    assert_eq!(gold_files(&forward.join("gold")), gold_files(&reversed.join("gold")));
    Ok(())
}

#[test]
fn rerun_overwrites_previous_gold_tables() -> Result<()> {
    let dir = tempdir()?;
    let silver = dir.path().join("clean.jsonl");
    let rejects = dir.path().join("rejects.jsonl");
    let gold = dir.path().join("gold");
    let use_case = GoldCurationUseCase::for_gold_dir(&gold);

    write_jsonl(&silver, &[silver_row("d1", "2024-01-01T10:00:00Z", "HIGH", "v1", 0.8)]);
    use_case.run(&silver, &rejects)?;
    let first = gold_files(&gold);

    use_case.run(&silver, &rejects)?;
    assert_eq!(gold_files(&gold), first);

    write_jsonl(&silver, &[]);
    let summary = use_case.run(&silver, &rejects)?;
    assert_eq!(summary.decision_rows, 0);
    assert_eq!(
        fs::read_to_string(gold.join(GOLD_DECISIONS_CSV))?,
        "decision_day,risk_band,model_version,decisions_count,avg_confidence_score\r\n"
    );
    Ok(())
}
