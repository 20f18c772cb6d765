//! # Error Types
//!
//! Custom error types for CRSF RX using `thiserror`.
//!
//! The frame, read and transport errors carry only plain integers so they
//! can be produced on the byte-delivery path without allocating.

use thiserror::Error;

/// Main error type for CRSF RX
#[derive(Debug, Error)]
pub enum CrsfRxError {
    /// CRSF frame errors
    #[error("CRSF frame error: {0}")]
    Frame(#[from] FrameError),

    /// Receiver binding errors
    #[error("Receiver binding error: {0}")]
    Bind(#[from] BindError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Snapshot serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while validating or serializing a single CRSF frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Fewer bytes than address + length + type + crc
    #[error("frame too short: {len} bytes")]
    TooShort { len: usize },

    /// Length field is implausible (below type + crc, or beyond the buffer)
    #[error("invalid length field: {len}")]
    InvalidLength { len: u8 },

    /// Checksum over type + payload does not match the trailing byte
    #[error("CRC mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    CrcMismatch { expected: u8, actual: u8 },

    /// Payload has the wrong size for its frame type, or exceeds the maximum
    #[error("payload size {len} invalid (expected {expected})")]
    PayloadSize { len: usize, expected: usize },

    /// Output buffer cannot hold the serialized frame
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Errors returned when reading the channel store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Channel index outside 0..16
    #[error("channel index {0} out of range")]
    InvalidChannel(usize),
}

/// Refusal reported by a transport when registering receiver callbacks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport has no free callback slot
    #[error("no free callback slot")]
    NoSlot,

    /// A callback of this kind is already registered
    #[error("callback already registered")]
    AlreadyBound,
}

/// Errors from binding a receiver to its transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The periodic tick callback could not be registered
    #[error("tick registration failed: {0}")]
    Tick(TransportError),

    /// The byte-delivery callback could not be bound
    #[error("receive binding failed: {0}")]
    Rx(TransportError),
}

/// Result type alias for CRSF RX
pub type Result<T> = std::result::Result<T, CrsfRxError>;
