//! EIS Serial Protocol
//!
//! Implements the one-way telemetry stream sent by an Engine Instrumentation
//! System.
//!
//! Frame format:
//! - 3 bytes: header `FE FF FE`
//! - 69 bytes: typed fields, big-endian, in [`FIELD_LAYOUT`] order
//! - 1 byte: one's complement of the 8-bit sum of the 69 field bytes

pub mod checksum;
mod error;
mod frame;
pub mod layout;
mod pipeline;
pub mod serial;
mod stream;
mod sync;

pub use error::ProtocolError;
pub use frame::RawFrame;
pub use layout::{DataType, Field, FieldDescriptor, FrameReader, FIELD_LAYOUT, LAYOUT_LEN};
pub use pipeline::{Pipeline, PipelineStats};
pub use serial::{configure_port, list_ports, open_port, PortInfo};
pub use stream::SerialSource;
pub use sync::{SyncState, Synchronizer, Transition};

/// Frame header pattern
pub const HEADER: [u8; HEADER_LEN] = [0xFE, 0xFF, 0xFE];

/// Length of the frame header
pub const HEADER_LEN: usize = 3;

/// Bytes read after a matched header: payload plus checksum
pub const CAPTURE_LEN: usize = LAYOUT_LEN - HEADER_LEN + 1;

/// Total frame length on the wire
pub const FRAME_LEN: usize = LAYOUT_LEN + 1;

/// Default baud rate of the EIS serial output
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default serial device
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Poll timeout handed to the serial driver in milliseconds.
/// Reads retry on expiry, so this never surfaces as an error.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 1000;
