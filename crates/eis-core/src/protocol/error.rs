//! Protocol errors

use thiserror::Error;

/// Errors that can occur while reading and decoding the EIS stream
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Stream read failed: {0}")]
    StreamError(#[source] std::io::Error),

    #[error("Stream closed while {0}")]
    UnexpectedEof(&'static str),

    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Layout decode failed for {field} at offset {offset}: need {needed} bytes, have {available}")]
    LayoutDecode {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Sink error: {0}")]
    SinkError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProtocolError {
    /// Whether the pipeline may drop the current frame and keep scanning.
    ///
    /// Only checksum mismatches are recoverable; everything else ends the
    /// pipeline.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::ChecksumMismatch { .. })
    }

    /// Map a read error, keeping end-of-stream distinct from other failures
    pub(crate) fn from_read(err: std::io::Error, context: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::UnexpectedEof(context)
        } else {
            ProtocolError::StreamError(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_only_checksum_is_recoverable() {
        assert!(ProtocolError::ChecksumMismatch {
            expected: 1,
            actual: 2
        }
        .is_recoverable());
        assert!(!ProtocolError::UnexpectedEof("reading frame").is_recoverable());
        assert!(!ProtocolError::StreamError(io::Error::other("boom")).is_recoverable());
    }

    #[test]
    fn test_eof_is_distinct_from_stream_error() {
        let eof = ProtocolError::from_read(io::ErrorKind::UnexpectedEof.into(), "reading frame");
        assert!(matches!(eof, ProtocolError::UnexpectedEof("reading frame")));

        let other = ProtocolError::from_read(io::ErrorKind::BrokenPipe.into(), "reading frame");
        assert!(matches!(other, ProtocolError::StreamError(_)));
    }

    #[test]
    fn test_checksum_display() {
        let err = ProtocolError::ChecksumMismatch {
            expected: 0x0f,
            actual: 0xa0,
        };
        assert_eq!(err.to_string(), "Checksum mismatch: expected 0x0f, got 0xa0");
    }
}
