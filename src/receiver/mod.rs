//! # Receiver Module
//!
//! CRSF receiver driver: turns an interrupt-delivered byte stream into
//! validated channel values, with timing-based failsafe.
//!
//! This module handles:
//! - Frame reassembly with bounded length handling
//! - Frame validation and decoding into the channel store
//! - Resync and link-loss supervision on a periodic tick
//! - Binding to a transport through the `Transport` capability
//!
//! Data flow:
//!
//! ```text
//! transport --deliver--> assembler --> decoder --> channel store <-- reader
//!     \------tick------> supervisor --------(failsafe)---^
//! ```

pub mod assembler;
pub mod channels;
pub mod driver;
pub mod stats;
pub mod supervisor;
pub mod transport;

pub use channels::ChannelValue;
pub use driver::{init, Delivery, LinkStatus, ReceiverHandle};
pub use stats::LinkStats;
pub use transport::Transport;
