use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one Gold table as both CSV (fixed column contract) and NDJSON (native row fields).
pub struct DualFormatWriter {
    csv_path: PathBuf,
    jsonl_path: PathBuf,
}

impl DualFormatWriter {
    pub fn new(csv_path: impl Into<PathBuf>, jsonl_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            jsonl_path: jsonl_path.into(),
        }
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn jsonl_path(&self) -> &Path {
        &self.jsonl_path
    }

    /// Overwrite both files with `rows`. The CSV header is exactly `fields`, in order.
    pub fn write_rows<T: Serialize>(&self, rows: &[T], fields: &[&str]) -> Result<()> {
        let mapped: Vec<Map<String, Value>> = rows
            .iter()
            .map(|row| -> Result<Map<String, Value>> {
                match serde_json::to_value(row)? {
                    Value::Object(map) => Ok(map),
                    other => anyhow::bail!("Gold rows must serialize to objects, got {}", other),
                }
            })
            .collect::<Result<_>>()?;

        write_csv(&self.csv_path, &mapped, fields)?;
        write_jsonl(&self.jsonl_path, &mapped)?;

        info!(
            rows = mapped.len(),
            csv = %self.csv_path.display(),
            jsonl = %self.jsonl_path.display(),
            "Gold table written"
        );
        Ok(())
    }
}

fn create_truncated(path: &Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn write_csv(path: &Path, rows: &[Map<String, Value>], fields: &[&str]) -> Result<()> {
    let mut writer = create_truncated(path)?;
    let header: Vec<String> = fields.iter().map(|f| escape_cell(f)).collect();
    write!(writer, "{}\r\n", header.join(","))?;

    for row in rows {
        let cells: Vec<String> = fields
            .iter()
            .map(|f| escape_cell(&render_cell(row.get(*f))))
            .collect();
        write!(writer, "{}\r\n", cells.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_jsonl(path: &Path, rows: &[Map<String, Value>]) -> Result<()> {
    let mut writer = create_truncated(path)?;
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Missing and null values are empty cells; strings are written bare.
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Quote only when the cell contains a delimiter, quote or line break.
fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
