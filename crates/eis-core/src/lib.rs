//! # EIS Core Library
//!
//! Core functionality for decoding Engine Instrumentation System telemetry.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Frame synchronization on the `FE FF FE` header
//! - One's-complement checksum validation
//! - Fixed-layout, big-endian record decoding
//! - Serial port enumeration and opening
//! - Record sinks for logging and JSON output
//! - A simulated EIS stream for running without hardware
//!
//! ## Example
//!
//! ```rust,ignore
//! use eis_core::{config::SerialConfig, protocol::{open_port, Pipeline}, sink::TracingSink};
//!
//! let source = open_port(&SerialConfig::default())?;
//! let mut pipeline = Pipeline::new(source);
//! pipeline.run(&mut TracingSink::default(), None)?;
//! ```

pub mod config;
pub mod demo;
pub mod protocol;
pub mod record;
pub mod sink;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{MonitorConfig, OutputConfig, OutputFormat, SerialConfig};
    pub use crate::demo::DemoSource;
    pub use crate::protocol::{
        Pipeline, PipelineStats, ProtocolError, RawFrame, SyncState, Synchronizer,
    };
    pub use crate::record::{EisRecord, FieldValue};
    pub use crate::sink::{JsonLinesSink, RecordSink, TracingSink};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
