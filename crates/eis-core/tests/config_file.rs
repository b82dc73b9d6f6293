//! Loading and saving monitor configuration

use eis_core::config::{MonitorConfig, OutputFormat, Parity};
use eis_core::protocol::ProtocolError;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eis.json");

    let mut config = MonitorConfig::default();
    config.serial.port_name = "/dev/ttyACM3".to_string();
    config.serial.parity = Parity::Odd;
    config.output.format = OutputFormat::JsonLines;
    config.output.max_records = Some(100);
    config.save(&path).unwrap();

    let loaded = MonitorConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eis.json");
    fs::write(&path, r#"{ "serial": { "baud_rate": 0 } }"#).unwrap();

    assert!(matches!(
        MonitorConfig::load(&path),
        Err(ProtocolError::ConfigError(_))
    ));
}

#[test]
fn test_load_rejects_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eis.json");
    fs::write(&path, "{ serial: ").unwrap();

    let err = MonitorConfig::load(&path).unwrap_err();
    assert!(matches!(err, ProtocolError::ConfigError(_)));
    assert!(err.to_string().contains("eis.json"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = MonitorConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ProtocolError::IoError(_)));
}
