//! Frame synchronization
//!
//! The stream has no length prefix or escaping, so the only way to find a frame
//! is to scan for the `FE FF FE` header. The scan is a three-state machine; a
//! byte that breaks a partial match is fed back in as a possible first header
//! byte, so overlapping patterns such as `FE FE FF FE` still synchronize.

use std::io::Read;

use super::{ProtocolError, HEADER};

/// Header match progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No header bytes matched
    #[default]
    NoMatch,
    /// Saw `FE`
    SawFe,
    /// Saw `FE FF`
    SawFeFf,
}

/// Result of feeding one byte to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The byte extended a partial match
    Pending,
    /// The byte completed the header
    Synchronized,
    /// This many stream bytes can no longer start a header
    Discarded(usize),
}

impl SyncState {
    /// Advance the matcher by one byte
    pub fn advance(self, byte: u8) -> (SyncState, Transition) {
        match (self, byte) {
            (SyncState::NoMatch, b) if b == HEADER[0] => (SyncState::SawFe, Transition::Pending),
            (SyncState::NoMatch, _) => (SyncState::NoMatch, Transition::Discarded(1)),

            (SyncState::SawFe, b) if b == HEADER[1] => (SyncState::SawFeFf, Transition::Pending),
            // The earlier FE is dropped; this one starts a new attempt
            (SyncState::SawFe, b) if b == HEADER[0] => (SyncState::SawFe, Transition::Discarded(1)),
            (SyncState::SawFe, _) => (SyncState::NoMatch, Transition::Discarded(2)),

            (SyncState::SawFeFf, b) if b == HEADER[2] => {
                (SyncState::NoMatch, Transition::Synchronized)
            }
            // HEADER[2] == HEADER[0], so a breaking byte can never restart a match
            (SyncState::SawFeFf, _) => (SyncState::NoMatch, Transition::Discarded(3)),
        }
    }

    /// Number of header bytes matched so far
    pub fn matched(&self) -> usize {
        match self {
            SyncState::NoMatch => 0,
            SyncState::SawFe => 1,
            SyncState::SawFeFf => 2,
        }
    }
}

/// Locates frame headers in a byte stream
#[derive(Debug, Default)]
pub struct Synchronizer {
    state: SyncState,
    bytes_skipped: u64,
}

impl Synchronizer {
    /// Create a synchronizer with no partial match
    pub fn new() -> Self {
        Self::default()
    }

    /// Current match state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Total bytes discarded while searching
    pub fn bytes_skipped(&self) -> u64 {
        self.bytes_skipped
    }

    /// Feed one byte, returning true once a full header has been seen
    pub fn feed(&mut self, byte: u8) -> bool {
        let (next, transition) = self.state.advance(byte);
        self.state = next;
        match transition {
            Transition::Pending => {
                tracing::trace!(byte, matched = next.matched(), "header byte");
                false
            }
            Transition::Synchronized => {
                tracing::trace!("header matched, synchronized");
                true
            }
            Transition::Discarded(count) => {
                self.bytes_skipped += count as u64;
                tracing::trace!(byte, discarded = count, "skipping");
                false
            }
        }
    }

    /// Read from `reader` one byte at a time until a header has been consumed.
    ///
    /// Returns the number of bytes skipped during this search. End of stream
    /// and read errors are returned as-is and are not retried.
    pub fn synchronize<R: Read>(&mut self, reader: &mut R) -> Result<u64, ProtocolError> {
        let skipped_before = self.bytes_skipped;
        let mut byte = [0u8; 1];
        loop {
            reader
                .read_exact(&mut byte)
                .map_err(|e| ProtocolError::from_read(e, "searching for frame header"))?;
            if self.feed(byte[0]) {
                return Ok(self.bytes_skipped - skipped_before);
            }
        }
    }
}
