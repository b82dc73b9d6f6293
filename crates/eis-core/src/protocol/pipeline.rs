//! Read, synchronize and decode loop
//!
//! One pass: find a header, read the bytes behind it, validate the checksum,
//! decode, hand the record to the sink. Checksum failures drop the frame and
//! scanning resumes after it. Everything else ends the loop.

use serde::Serialize;
use std::io::{BufReader, Read};

use super::{ProtocolError, RawFrame, Synchronizer, CAPTURE_LEN};
use crate::record::EisRecord;
use crate::sink::RecordSink;

/// Counters collected while the pipeline runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Frames that passed the checksum and were decoded
    pub frames_decoded: u64,
    /// Frames dropped on checksum mismatch
    pub checksum_failures: u64,
    /// Bytes discarded while searching for a header
    pub bytes_skipped: u64,
}

/// Single-threaded decoder over a blocking byte source
pub struct Pipeline<R: Read> {
    reader: BufReader<R>,
    synchronizer: Synchronizer,
    stats: PipelineStats,
    synchronized: bool,
}

impl<R: Read> Pipeline<R> {
    /// Create a pipeline reading from `source`
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
            synchronizer: Synchronizer::new(),
            stats: PipelineStats::default(),
            synchronized: false,
        }
    }

    /// Counters so far
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            bytes_skipped: self.synchronizer.bytes_skipped(),
            ..self.stats
        }
    }

    /// Give back the byte source
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Find the next header and capture the frame behind it
    pub fn next_frame(&mut self) -> Result<RawFrame, ProtocolError> {
        let skipped = self.synchronizer.synchronize(&mut self.reader)?;
        if !self.synchronized {
            tracing::info!(skipped, "synchronized");
            self.synchronized = true;
        } else if skipped > 0 {
            tracing::debug!(skipped, "resynchronized");
        }

        let mut capture = [0u8; CAPTURE_LEN];
        self.reader
            .read_exact(&mut capture)
            .map_err(|e| ProtocolError::from_read(e, "reading frame"))?;
        Ok(RawFrame::from_capture(capture))
    }

    /// Read and decode the next frame.
    ///
    /// A checksum mismatch is counted and returned; the caller may keep going.
    pub fn next_record(&mut self) -> Result<EisRecord, ProtocolError> {
        let frame = self.next_frame()?;
        match EisRecord::decode(&frame) {
            Ok(record) => {
                self.stats.frames_decoded += 1;
                Ok(record)
            }
            Err(e) => {
                if e.is_recoverable() {
                    self.stats.checksum_failures += 1;
                }
                Err(e)
            }
        }
    }

    /// Decode frames into `sink` until a fatal error, or until `max_records`
    /// records have been delivered.
    pub fn run<S: RecordSink + ?Sized>(
        &mut self,
        sink: &mut S,
        max_records: Option<u64>,
    ) -> Result<PipelineStats, ProtocolError> {
        let mut delivered = 0u64;
        while max_records.map_or(true, |max| delivered < max) {
            match self.next_record() {
                Ok(record) => {
                    tracing::debug!(tach = record.tach, "frame decoded");
                    sink.on_record(record)?;
                    delivered += 1;
                }
                Err(ProtocolError::ChecksumMismatch { expected, actual }) => {
                    tracing::warn!(expected, actual, "invalid checksum, frame dropped");
                    sink.on_checksum_mismatch(expected, actual)?;
                }
                Err(e) => {
                    tracing::error!(error = %e, stats = ?self.stats(), "pipeline stopped");
                    return Err(e);
                }
            }
        }
        Ok(self.stats())
    }
}
