//! # CRSF RX Library
//!
//! Receiver-side CRSF (Crossfire) driver for flight controllers.
//!
//! This library turns the raw, noisy byte stream from an ExpressLRS / TBS
//! receiver into validated RC channel values, and replaces them with an
//! explicit timeout marker when the link drops.
//!
//! ```
//! use crsf_rx::crsf::encoder::encode_rc_channels_frame;
//! use crsf_rx::config::ReceiverConfig;
//! use crsf_rx::receiver::{init, ChannelValue, ReceiverHandle, Transport};
//! use crsf_rx::error::TransportError;
//!
//! #[derive(Default)]
//! struct Uart {
//!     rx: Option<ReceiverHandle>,
//! }
//!
//! impl Transport for Uart {
//!     fn register_tick(&mut self, _: ReceiverHandle) -> Result<(), TransportError> { Ok(()) }
//!     fn unregister_tick(&mut self) {}
//!     fn bind_rx(&mut self, rx: ReceiverHandle) -> Result<(), TransportError> {
//!         self.rx = Some(rx);
//!         Ok(())
//!     }
//! }
//!
//! let mut uart = Uart::default();
//! let receiver = init(&mut uart, &ReceiverConfig::default()).unwrap();
//!
//! uart.rx.as_ref().unwrap().deliver(&encode_rc_channels_frame(&[992; 16]));
//! assert_eq!(receiver.read(0), Ok(ChannelValue::Raw(992)));
//! ```

pub mod config;
pub mod error;
pub mod crsf;
pub mod monitor;
pub mod receiver;
pub mod serial;
