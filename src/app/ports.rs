use anyhow::Result;
use serde::Serialize;

/// Append-only destination for one output stream (Silver clean or Rejects)
pub trait RecordSink<T: Serialize> {
    fn write_record(&mut self, record: &T) -> Result<()>;

    /// Make everything written so far durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
