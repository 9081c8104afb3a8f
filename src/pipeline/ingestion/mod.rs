// Pipeline ingestion: landing file discovery and line-oriented JSON readers

pub mod synthetic;

use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::LANDING_EXTENSION;
use crate::domain::RawRecord;
use crate::error::Result;

/// List `*.jsonl` files directly inside `dir`, sorted by path.
///
/// A directory that does not exist has no files.
pub fn discover_landing_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!("Landing directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_jsonl = path.extension().map(|e| e == LANDING_EXTENSION).unwrap_or(false);
        if is_jsonl && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Iterator over the lines of a file, decoded lossily so bad bytes never stop a run.
pub struct JsonlLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl JsonlLines<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for JsonlLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).into_owned())),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Why a landing line could not become a [`RawRecord`]
#[derive(Debug)]
pub enum LineParseError {
    Malformed(serde_json::Error),
    NotAnObject,
}

/// Parse one trimmed line as a JSON object.
pub fn parse_object_line(line: &str) -> std::result::Result<RawRecord, LineParseError> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LineParseError::NotAnObject),
        Err(e) => Err(LineParseError::Malformed(e)),
    }
}

/// Read every JSON object from a line-delimited file.
///
/// Missing files read as empty; blank, malformed and non-object lines are skipped.
pub fn read_jsonl_objects(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        debug!("{} not found, treating as empty input", path.display());
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for line in JsonlLines::open(path)? {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Ok(record) = parse_object_line(trimmed) {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn discovery_is_sorted_and_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), "").unwrap();
        fs::write(dir.path().join("a.jsonl"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.jsonl")).unwrap();

        let files = discover_landing_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jsonl", "b.jsonl"]);
    }

    #[test]
    fn missing_directory_has_no_files() {
        let dir = tempdir().unwrap();
        let files = discover_landing_files(&dir.path().join("absent")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn lines_survive_invalid_utf8() {
        let bytes: &[u8] = b"{\"a\":1}\n\xff\xfe\nlast";
        let lines: Vec<String> = JsonlLines::new(Cursor::new(bytes))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].trim(), "{\"a\":1}");
        assert!(lines[1].contains('\u{FFFD}'));
        assert_eq!(lines[2], "last");
    }

    #[test]
    fn only_objects_parse() {
        assert!(parse_object_line(r#"{"decision_id":"x"}"#).is_ok());
        assert!(matches!(parse_object_line("[1,2]"), Err(LineParseError::NotAnObject)));
        assert!(matches!(parse_object_line("42"), Err(LineParseError::NotAnObject)));
        assert!(matches!(parse_object_line("{oops"), Err(LineParseError::Malformed(_))));
    }

    #[test]
    fn reading_objects_skips_noise_and_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silver.jsonl");
        fs::write(&path, "{\"a\":1}\n\n  \nnot json\n[1]\n{\"b\":2}\n").unwrap();

        let rows = read_jsonl_objects(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(read_jsonl_objects(&dir.path().join("nope.jsonl")).unwrap().is_empty());
    }
}
