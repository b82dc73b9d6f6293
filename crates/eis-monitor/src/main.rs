//! eis-monitor - EIS telemetry monitor
//!
//! Opens the instrument's serial output, decodes every frame and prints the
//! records as log lines or JSON.

#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eis_core::config::{MonitorConfig, OutputFormat};
use eis_core::demo::DemoSource;
use eis_core::protocol::{list_ports, open_port, Pipeline, PipelineStats, ProtocolError};
use eis_core::sink::{JsonLinesSink, RecordSink, TracingSink};

#[derive(Parser, Debug)]
#[command(name = "eis-monitor")]
#[command(about = "Decode Engine Instrumentation System telemetry from a serial port")]
#[command(version)]
struct Cli {
    /// Serial port (overrides the config file)
    #[arg(short, long, env = "EIS_PORT")]
    port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Print records as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Read from the built-in simulator instead of a serial port
    #[arg(long)]
    demo: bool,

    /// Stop after this many records
    #[arg(long)]
    max_frames: Option<u64>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("eis={log_level},eis_core={log_level},eis_monitor={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if cli.list_ports {
        return print_ports();
    }

    let config = resolve_config(&cli)?;
    let result = if cli.demo {
        tracing::info!("running against simulated EIS output");
        monitor(DemoSource::new().noise(4).corrupt_every(50), &config)
    } else {
        for port in list_ports() {
            tracing::debug!(port = %port.name, product = ?port.product, "found port");
        }
        let source = open_port(&config.serial)
            .with_context(|| format!("failed to open {}", config.serial.port_name))?;
        monitor(source, &config)
    };
    let stats = result?;

    tracing::info!(
        frames = stats.frames_decoded,
        checksum_failures = stats.checksum_failures,
        skipped = stats.bytes_skipped,
        "done"
    );
    Ok(())
}

fn print_ports() -> Result<()> {
    let ports = list_ports();
    if ports.is_empty() {
        return Err(ProtocolError::PortNotFound("no serial ports found".to_string()).into());
    }
    for port in ports {
        match port.product {
            Some(product) => println!("Found port: {} ({})", port.name, product),
            None => println!("Found port: {}", port.name),
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<MonitorConfig> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    if let Some(port) = &cli.port {
        config.serial.port_name = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    if cli.json {
        config.output.format = OutputFormat::JsonLines;
    }
    if cli.max_frames.is_some() {
        config.output.max_records = cli.max_frames;
    }

    config.validate()?;
    Ok(config)
}

fn monitor<R: Read>(source: R, config: &MonitorConfig) -> Result<PipelineStats> {
    let mut sink: Box<dyn RecordSink> = match config.output.format {
        OutputFormat::Log => Box::new(TracingSink::new()),
        OutputFormat::JsonLines => Box::new(JsonLinesSink::new(io::stdout().lock())),
    };

    tracing::info!("synchronizing");
    let mut pipeline = Pipeline::new(source);
    let stats = pipeline
        .run(sink.as_mut(), config.output.max_records)
        .context("telemetry stream stopped")?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "eis-monitor",
            "--port",
            "/dev/ttyUSB3",
            "--baud",
            "19200",
            "--json",
            "--max-frames",
            "5",
        ]);
        let config = resolve_config(&cli).expect("valid config");
        assert_eq!(config.serial.port_name, "/dev/ttyUSB3");
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.output.format, OutputFormat::JsonLines);
        assert_eq!(config.output.max_records, Some(5));
    }

    #[test]
    fn test_zero_baud_rejected() {
        let cli = Cli::parse_from(["eis-monitor", "--baud", "0"]);
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_demo_run_with_limit() {
        let config = MonitorConfig {
            output: eis_core::config::OutputConfig {
                format: OutputFormat::Log,
                max_records: Some(10),
            },
            ..MonitorConfig::default()
        };
        let stats = monitor(DemoSource::with_seed(3), &config).expect("demo run");
        assert_eq!(stats.frames_decoded, 10);
    }
}
