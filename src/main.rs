//! # CRSF RX Monitor
//!
//! Binds the CRSF receiver driver to a serial port and prints channel
//! snapshots as JSON Lines until interrupted.
//!
//! # Usage
//!
//! ```bash
//! crsf-rx [config.toml]
//! ```
//!
//! Without an argument, `config/default.toml` is used when present,
//! otherwise built-in defaults. Set `monitor.loopback = true` to feed the
//! receiver from a local frame generator instead of hardware.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::interval;
use tracing::{error, info};

use crsf_rx::config::Config;
use crsf_rx::monitor::ChannelSnapshot;
use crsf_rx::receiver::{self, ReceiverHandle};
use crsf_rx::serial::loopback::{self, LOOPBACK_RATE_HZ};
use crsf_rx::serial::SerialTransport;

/// Configuration file used when none is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Pipe capacity between the loopback source and the transport
const LOOPBACK_PIPE_SIZE: usize = 1024;

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("loading {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Print a snapshot line every `period` until the task is aborted
async fn print_snapshots(receiver: ReceiverHandle, period: Duration) {
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        match ChannelSnapshot::capture(&receiver).to_json_line() {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize snapshot: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("CRSF RX v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let tick_period = config.tick_period();
    info!(
        "Resync after {:?} of silence, failsafe after {:?} without a valid frame",
        config.resync_window(),
        config.failsafe_window()
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down...");
    };

    let result = if config.monitor.loopback {
        let (source, sink) = tokio::io::duplex(LOOPBACK_PIPE_SIZE);
        let mut transport = SerialTransport::new(sink, "loopback", tick_period);
        let handle = receiver::init(&mut transport, &config.receiver)?;

        let generator = tokio::spawn(loopback::run_source(source, LOOPBACK_RATE_HZ, None));
        let printer = config.monitor.enabled.then(|| {
            tokio::spawn(print_snapshots(handle.clone(), Duration::from_millis(config.monitor.interval_ms)))
        });

        let result = transport.run(shutdown).await;
        generator.abort();
        if let Some(printer) = printer {
            printer.abort();
        }
        info!("Final link stats: {:?}", handle.stats());
        result
    } else {
        let mut transport = SerialTransport::open_with_paths(
            &[config.serial.port.as_str()],
            config.serial.baud_rate,
            tick_period,
        )?;
        let handle = receiver::init(&mut transport, &config.receiver)?;

        let printer = config.monitor.enabled.then(|| {
            tokio::spawn(print_snapshots(handle.clone(), Duration::from_millis(config.monitor.interval_ms)))
        });

        let result = transport.run(shutdown).await;
        if let Some(printer) = printer {
            printer.abort();
        }
        info!("Final link stats: {:?}", handle.stats());
        result
    };

    result.context("receive loop failed")
}
