//! # Serial Transport Module
//!
//! Host-side transport that feeds a CRSF receiver from a serial port.
//!
//! This module handles:
//! - Opening the receiver UART at 420,000 baud, 8N1
//! - Delivering received bytes to the bound receiver
//! - Driving the supervisor tick from a `tokio` interval
//!
//! Reads and ticks run in one `select!` loop, so the receiver never sees a
//! delivery and a tick at the same time.

pub mod loopback;

use std::future::Future;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::interval;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, trace, warn};

use crate::error::{CrsfRxError, Result, TransportError};
use crate::receiver::{ReceiverHandle, Transport};

/// CRSF baud rate for ELRS receivers (420,000 baud)
pub const CRSF_BAUD_RATE: u32 = 420_000;

/// Default receiver device paths to try (in order of preference)
pub const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters
    "/dev/ttyAMA0", // On-board UART (Raspberry Pi)
    "/dev/ttyACM0", // USB CDC devices
];

/// Read buffer size; a few frames' worth
const READ_BUFFER_SIZE: usize = 256;

/// Transport that reads bytes from `R` and ticks on a fixed period
pub struct SerialTransport<R> {
    reader: R,
    device_path: String,
    tick_period: Duration,
    rx: Option<ReceiverHandle>,
    tick: Option<ReceiverHandle>,
}

impl<R> std::fmt::Debug for SerialTransport<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device_path", &self.device_path)
            .field("tick_period", &self.tick_period)
            .field("rx_bound", &self.rx.is_some())
            .field("tick_registered", &self.tick.is_some())
            .finish_non_exhaustive()
    }
}

impl SerialTransport<tokio_serial::SerialStream> {
    /// Open the first available device from `paths`
    ///
    /// # Errors
    ///
    /// Returns `CrsfRxError::SerialPortNotFound` if no path could be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use crsf_rx::serial::{SerialTransport, CRSF_BAUD_RATE};
    ///
    /// let transport = SerialTransport::open_with_paths(
    ///     &["/dev/ttyUSB0"],
    ///     CRSF_BAUD_RATE,
    ///     Duration::from_millis(1),
    /// )?;
    /// println!("Reading from {}", transport.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, tick_period: Duration) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened CRSF receiver at {} ({} baud)", path, baud_rate);
                    return Ok(Self::new(port, *path, tick_period));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(CrsfRxError::SerialPortNotFound(paths.join(", ")))
    }
}

/// Open a specific serial port with CRSF settings (8N1, no flow control)
///
/// # Errors
///
/// Returns `CrsfRxError::Serial` if the port cannot be opened
pub fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
    tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| CrsfRxError::Serial(format!("Failed to open {}: {}", path, e)))
}

impl<R: AsyncRead + Unpin> SerialTransport<R> {
    /// Wrap an already opened byte source
    pub fn new(reader: R, device_path: impl Into<String>, tick_period: Duration) -> Self {
        Self {
            reader,
            device_path: device_path.into(),
            tick_period,
            rx: None,
            tick: None,
        }
    }

    /// Device path this transport reads from
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Pump bytes and ticks until `shutdown` completes
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No receiver is bound to the receive path
    /// - The tick period is zero
    /// - Reading fails or the port reports end of stream
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let rx = self.rx.take().ok_or_else(|| {
            CrsfRxError::Serial(format!("No receiver bound to {}", self.device_path))
        })?;
        let tick = self.tick.take();

        if self.tick_period.is_zero() {
            return Err(CrsfRxError::Serial("Tick period must be non-zero".to_string()));
        }

        let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);
        let mut ticker = interval(self.tick_period);
        tokio::pin!(shutdown);

        info!(
            "Receiving from {} (tick every {}us)",
            self.device_path,
            self.tick_period.as_micros()
        );

        loop {
            tokio::select! {
                read = self.reader.read_buf(&mut buf) => {
                    match read {
                        Ok(0) => {
                            return Err(CrsfRxError::Serial(format!(
                                "Serial port {} closed",
                                self.device_path
                            )));
                        }
                        Ok(n) => {
                            let delivery = rx.deliver(&buf);
                            trace!("Delivered {} bytes (headroom {})", n, delivery.headroom);
                            buf.clear();
                        }
                        Err(e) => {
                            return Err(CrsfRxError::Serial(format!(
                                "Failed to read from {}: {}",
                                self.device_path, e
                            )));
                        }
                    }
                }

                _ = ticker.tick() => {
                    if let Some(tick) = &tick {
                        tick.tick();
                    }
                }

                _ = &mut shutdown => {
                    info!("Stopping receive loop on {}", self.device_path);
                    return Ok(());
                }
            }
        }
    }
}

impl<R> Transport for SerialTransport<R> {
    fn register_tick(&mut self, receiver: ReceiverHandle) -> std::result::Result<(), TransportError> {
        if self.tick.is_some() {
            return Err(TransportError::AlreadyBound);
        }
        self.tick = Some(receiver);
        Ok(())
    }

    fn unregister_tick(&mut self) {
        self.tick = None;
    }

    fn bind_rx(&mut self, receiver: ReceiverHandle) -> std::result::Result<(), TransportError> {
        if self.rx.is_some() {
            return Err(TransportError::AlreadyBound);
        }
        self.rx = Some(receiver);
        Ok(())
    }
}
