//! Record sinks
//!
//! Where decoded records go. The pipeline does not care whether a sink logs,
//! prints or forwards them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::protocol::ProtocolError;
use crate::record::EisRecord;

/// Receives decoded records from the pipeline
pub trait RecordSink {
    /// Called once per frame that passed the checksum.
    ///
    /// An error here stops the pipeline.
    fn on_record(&mut self, record: EisRecord) -> Result<(), ProtocolError>;

    /// Called when a frame is dropped for a bad checksum
    fn on_checksum_mismatch(&mut self, _expected: u8, _actual: u8) -> Result<(), ProtocolError> {
        Ok(())
    }
}

impl RecordSink for Vec<EisRecord> {
    fn on_record(&mut self, record: EisRecord) -> Result<(), ProtocolError> {
        self.push(record);
        Ok(())
    }
}

/// Logs every record through `tracing` at INFO level
#[derive(Debug, Default)]
pub struct TracingSink {
    records: u64,
}

impl TracingSink {
    /// Create a new sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Records logged so far
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl RecordSink for TracingSink {
    fn on_record(&mut self, record: EisRecord) -> Result<(), ProtocolError> {
        self.records += 1;
        tracing::info!(target: "eis::record", "{}", record);
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    received_at: DateTime<Utc>,
    #[serde(flatten)]
    record: &'a EisRecord,
}

/// Writes one JSON object per record, one per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn on_record(&mut self, record: EisRecord) -> Result<(), ProtocolError> {
        let line = JsonLine {
            received_at: Utc::now(),
            record: &record,
        };
        serde_json::to_writer(&mut self.writer, &line)
            .map_err(|e| ProtocolError::SinkError(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
