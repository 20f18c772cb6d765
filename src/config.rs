//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{CrsfRxError, Result};
use crate::receiver::supervisor::Thresholds;

/// Baud rates accepted by CRSF receivers
const VALID_BAUD_RATES: [u32; 6] = [115200, 400000, 420000, 921600, 1870000, 3750000];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub receiver: ReceiverConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Serial transport configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Period of the supervisor tick driven by the transport
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u64,
}

/// Receiver timing configuration, in supervisor ticks
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_resync_ticks")]
    pub resync_ticks: u16,

    #[serde(default = "default_failsafe_ticks")]
    pub failsafe_ticks: u16,
}

/// Channel monitor output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_monitor_enabled")]
    pub enabled: bool,

    #[serde(default = "default_monitor_interval_ms")]
    pub interval_ms: u64,

    /// Feed the receiver from a local encoder instead of a serial port
    #[serde(default)]
    pub loopback: bool,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 420000 }
fn default_tick_period_us() -> u64 { 500 }

fn default_resync_ticks() -> u16 { Thresholds::default().resync_ticks }
fn default_failsafe_ticks() -> u16 { Thresholds::default().failsafe_ticks }

fn default_monitor_enabled() -> bool { true }
fn default_monitor_interval_ms() -> u64 { 1000 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            tick_period_us: default_tick_period_us(),
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            resync_ticks: default_resync_ticks(),
            failsafe_ticks: default_failsafe_ticks(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_monitor_enabled(),
            interval_ms: default_monitor_interval_ms(),
            loopback: false,
        }
    }
}

impl ReceiverConfig {
    /// Supervisor thresholds described by this configuration
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            resync_ticks: self.resync_ticks,
            failsafe_ticks: self.failsafe_ticks,
        }
    }
}

fn invalid(msg: &str) -> CrsfRxError {
    CrsfRxError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_rx::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Period of the supervisor tick
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(self.serial.tick_period_us)
    }

    /// Silence after which a partial frame is dropped
    pub fn resync_window(&self) -> Duration {
        self.tick_period() * (u32::from(self.receiver.resync_ticks) + 1)
    }

    /// Time without a valid frame after which channels read `Timeout`
    pub fn failsafe_window(&self) -> Duration {
        self.tick_period() * (u32::from(self.receiver.failsafe_ticks) + 1)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() && !self.monitor.loopback {
            return Err(invalid("serial port cannot be empty"));
        }

        if !VALID_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 115200, 400000, 420000, 921600, 1870000, 3750000",
            ));
        }

        if self.serial.tick_period_us < 100 || self.serial.tick_period_us > 10000 {
            return Err(invalid("tick_period_us must be between 100 and 10000"));
        }

        if self.receiver.resync_ticks == 0 {
            return Err(invalid("resync_ticks must be greater than 0"));
        }

        if self.receiver.failsafe_ticks <= self.receiver.resync_ticks {
            return Err(invalid("failsafe_ticks must be greater than resync_ticks"));
        }

        if self.monitor.interval_ms == 0 || self.monitor.interval_ms > 60000 {
            return Err(invalid("monitor interval_ms must be between 1 and 60000"));
        }

        Ok(())
    }
}
