use crate::app::ports::RecordSink;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File-based implementation of RecordSink
/// Writes one JSON object per line, truncating any previous run's output
pub struct NdjsonFileSink {
    file_writer: BufWriter<File>,
    file_path: PathBuf,
    rows_written: usize,
}

impl NdjsonFileSink {
    pub fn create(file_path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        info!("Creating output file: {}", file_path.display());

        let file_writer = BufWriter::new(
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(file_path)?,
        );

        Ok(Self {
            file_writer,
            file_path: file_path.to_path_buf(),
            rows_written: 0,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

impl<T: Serialize> RecordSink<T> for NdjsonFileSink {
    fn write_record(&mut self, record: &T) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.file_writer, record)?;
        self.file_writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.file_writer.flush()?;
        info!(
            rows = self.rows_written,
            "Flushed output file: {}",
            self.file_path().display()
        );
        Ok(())
    }
}
