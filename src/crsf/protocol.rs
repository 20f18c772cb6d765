//! # CRSF Protocol Constants and Types
//!
//! Core protocol definitions for CRSF (Crossfire) receiver frames.
//!
//! Wire layout of a frame as seen on the receiver UART:
//!
//! ```text
//! [address][length][type][payload ...][crc]
//!           \________ length bytes ________/
//! ```
//!
//! The CRC covers `type + payload`.

use crate::error::FrameError;

/// Address byte used by flight controllers (receivers address frames to it)
pub const CRSF_ADDRESS_FLIGHT_CONTROLLER: u8 = 0xC8;

/// Offset of the address field
pub const CRSF_ADDRESS_IDX: usize = 0;

/// Offset of the length field
pub const CRSF_LENGTH_IDX: usize = 1;

/// Offset of the type field
pub const CRSF_TYPE_IDX: usize = 2;

/// Offset of the first payload byte
pub const CRSF_PAYLOAD_IDX: usize = 3;

/// Size of the address + length header
pub const CRSF_HEADER_LEN: usize = 2;

/// Size of the type field
pub const CRSF_TYPE_LEN: usize = 1;

/// Size of the CRC field
pub const CRSF_CRC_LEN: usize = 1;

/// RC Channels packet type
pub const CRSF_FRAMETYPE_RC_CHANNELS_PACKED: u8 = 0x16;

/// Link Statistics packet type
pub const CRSF_FRAMETYPE_LINK_STATISTICS: u8 = 0x14;

/// Maximum CRSF payload size handled by the receiver
pub const CRSF_MAX_PAYLOAD_SIZE: usize = 32;

/// Maximum frame size: address(1) + length(1) + type(1) + payload(32) + crc(1)
pub const CRSF_MAX_FRAME_LEN: usize =
    CRSF_HEADER_LEN + CRSF_TYPE_LEN + CRSF_MAX_PAYLOAD_SIZE + CRSF_CRC_LEN;

/// Smallest legal value of the length field (type + crc, empty payload)
pub const CRSF_MIN_LENGTH_FIELD: u8 = (CRSF_TYPE_LEN + CRSF_CRC_LEN) as u8;

/// RC channels payload size (22 bytes for 16 channels × 11 bits)
pub const CRSF_RC_CHANNELS_PAYLOAD_SIZE: usize = 22;

/// RC channels frame length field (type + payload + crc)
pub const CRSF_RC_CHANNELS_FRAME_LENGTH: u8 = 0x18; // 24 bytes

/// Complete RC channels frame size on the wire
pub const CRSF_RC_CHANNELS_FRAME_SIZE: usize = CRSF_HEADER_LEN + CRSF_RC_CHANNELS_FRAME_LENGTH as usize;

/// Number of RC channels
pub const CRSF_NUM_CHANNELS: usize = 16;

/// Bits per packed channel
pub const CRSF_CHANNEL_BITS: usize = 11;

/// Channel value range (11-bit: 0-2047)
pub const CRSF_CHANNEL_VALUE_MIN: u16 = 0;
pub const CRSF_CHANNEL_VALUE_MAX: u16 = 2047;
pub const CRSF_CHANNEL_VALUE_CENTER: u16 = 1024;

/// Stick center as sent by CRSF transmitters (1500us)
pub const CRSF_CHANNEL_VALUE_MID: u16 = 992;

/// Link Statistics payload size
pub const CRSF_LINK_STATS_PAYLOAD_SIZE: usize = 10;

/// RC channels array type (16 channels, 11-bit values)
pub type RcChannels = [u16; CRSF_NUM_CHANNELS];

/// Known frame types, used for dispatch and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    RcChannelsPacked,
    LinkStatistics,
    Other(u8),
}

impl From<u8> for FrameType {
    fn from(value: u8) -> Self {
        match value {
            CRSF_FRAMETYPE_RC_CHANNELS_PACKED => FrameType::RcChannelsPacked,
            CRSF_FRAMETYPE_LINK_STATISTICS => FrameType::LinkStatistics,
            other => FrameType::Other(other),
        }
    }
}

impl From<FrameType> for u8 {
    fn from(value: FrameType) -> Self {
        match value {
            FrameType::RcChannelsPacked => CRSF_FRAMETYPE_RC_CHANNELS_PACKED,
            FrameType::LinkStatistics => CRSF_FRAMETYPE_LINK_STATISTICS,
            FrameType::Other(other) => other,
        }
    }
}

/// Link statistics telemetry data
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LinkStatistics {
    /// Uplink RSSI (antenna 1) in -dBm
    pub uplink_rssi_1: u8,

    /// Uplink RSSI (antenna 2) in -dBm (diversity)
    pub uplink_rssi_2: u8,

    /// Uplink link quality (0-100%)
    pub uplink_lq: u8,

    /// Uplink SNR in dB
    pub uplink_snr: i8,

    /// Active antenna (0 or 1)
    pub active_antenna: u8,

    /// RF mode / packet rate
    pub rf_mode: u8,

    /// Uplink TX power (encoded)
    pub uplink_tx_power: u8,

    /// Downlink RSSI in -dBm
    pub downlink_rssi: u8,

    /// Downlink link quality (0-100%)
    pub downlink_lq: u8,

    /// Downlink SNR in dB
    pub downlink_snr: i8,
}

/// Borrowed view of a validated CRSF frame
///
/// Holds no buffer of its own: `payload` points into the receive buffer
/// the frame was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrsfFrame<'a> {
    /// Address byte (not interpreted by the receiver)
    pub address: u8,

    /// Frame type byte
    pub frame_type: u8,

    /// Payload data (without type and CRC)
    pub payload: &'a [u8],
}

impl<'a> CrsfFrame<'a> {
    /// Create a frame view
    ///
    /// # Errors
    ///
    /// Returns `FrameError::PayloadSize` if payload exceeds CRSF_MAX_PAYLOAD_SIZE
    pub fn new(address: u8, frame_type: u8, payload: &'a [u8]) -> Result<Self, FrameError> {
        if payload.len() > CRSF_MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadSize {
                len: payload.len(),
                expected: CRSF_MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            address,
            frame_type,
            payload,
        })
    }

    /// Get frame length field value (type + payload + crc)
    ///
    /// Cannot overflow since payload is validated to be ≤ 32 bytes
    pub fn length(&self) -> u8 {
        (CRSF_TYPE_LEN + self.payload.len() + CRSF_CRC_LEN) as u8
    }

    /// Total number of bytes the frame occupies on the wire
    pub fn wire_len(&self) -> usize {
        CRSF_HEADER_LEN + self.length() as usize
    }

    /// Classified frame type
    pub fn kind(&self) -> FrameType {
        FrameType::from(self.frame_type)
    }

    /// Serialize the frame into `out`, computing the CRC
    ///
    /// # Returns
    ///
    /// * `Result<usize, FrameError>` - Number of bytes written
    ///
    /// # Errors
    ///
    /// Returns `FrameError::BufferTooSmall` if `out` cannot hold the frame
    pub fn write_to(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let needed = self.wire_len();
        if out.len() < needed {
            return Err(FrameError::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }

        out[CRSF_ADDRESS_IDX] = self.address;
        out[CRSF_LENGTH_IDX] = self.length();
        out[CRSF_TYPE_IDX] = self.frame_type;
        out[CRSF_PAYLOAD_IDX..CRSF_PAYLOAD_IDX + self.payload.len()].copy_from_slice(self.payload);
        out[needed - CRSF_CRC_LEN] = super::crc::crc8_dvb_s2(&out[CRSF_TYPE_IDX..needed - CRSF_CRC_LEN]);

        Ok(needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_value_ranges() {
        assert_eq!(CRSF_CHANNEL_VALUE_MIN, 0);
        assert_eq!(CRSF_CHANNEL_VALUE_MAX, 2047);
        assert_eq!(CRSF_CHANNEL_VALUE_CENTER, 1024);
        assert_eq!(CRSF_CHANNEL_VALUE_MAX as usize, (1 << CRSF_CHANNEL_BITS) - 1);
    }

    #[test]
    fn test_frame_constants() {
        assert_eq!(CRSF_FRAMETYPE_RC_CHANNELS_PACKED, 0x16);
        assert_eq!(CRSF_FRAMETYPE_LINK_STATISTICS, 0x14);
        assert_eq!(CRSF_NUM_CHANNELS, 16);
        assert_eq!(CRSF_MAX_FRAME_LEN, 36);
        assert_eq!(CRSF_RC_CHANNELS_FRAME_SIZE, 26);
        // 16 channels × 11 bits = 22 bytes
        assert_eq!(CRSF_NUM_CHANNELS * CRSF_CHANNEL_BITS / 8, CRSF_RC_CHANNELS_PAYLOAD_SIZE);
    }

    #[test]
    fn test_frame_type_classification() {
        assert_eq!(FrameType::from(0x16), FrameType::RcChannelsPacked);
        assert_eq!(FrameType::from(0x14), FrameType::LinkStatistics);
        assert_eq!(FrameType::from(0x29), FrameType::Other(0x29));
        assert_eq!(u8::from(FrameType::Other(0x29)), 0x29);
    }

    #[test]
    fn test_crsf_frame() {
        let payload = [0u8; 22];
        let frame = CrsfFrame::new(0xC8, CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &payload).unwrap();
        assert_eq!(frame.frame_type, 0x16);
        assert_eq!(frame.payload.len(), 22);
        assert_eq!(frame.length(), 24); // 1 (type) + 22 (payload) + 1 (crc)
        assert_eq!(frame.wire_len(), 26);
    }

    #[test]
    fn test_crsf_frame_payload_too_large() {
        let payload = [0u8; 33];
        let result = CrsfFrame::new(0xC8, CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &payload);
        assert_eq!(result, Err(FrameError::PayloadSize { len: 33, expected: 32 }));
    }

    #[test]
    fn test_crsf_frame_max_payload_fills_buffer() {
        let payload = [0u8; CRSF_MAX_PAYLOAD_SIZE];
        let frame = CrsfFrame::new(0xC8, 0x7F, &payload).unwrap();
        assert_eq!(frame.length(), 34);
        assert_eq!(frame.wire_len(), CRSF_MAX_FRAME_LEN);
    }

    #[test]
    fn test_write_to_layout() {
        let payload = [0x01, 0x02, 0x03];
        let frame = CrsfFrame::new(0xEE, 0x29, &payload).unwrap();
        let mut out = [0u8; 16];

        let written = frame.write_to(&mut out).unwrap();
        assert_eq!(written, 7);
        assert_eq!(&out[..6], &[0xEE, 0x05, 0x29, 0x01, 0x02, 0x03]);
        assert_eq!(out[6], crate::crsf::crc::crc8_dvb_s2(&[0x29, 0x01, 0x02, 0x03]));
    }

    #[test]
    fn test_write_to_buffer_too_small() {
        let payload = [0u8; 22];
        let frame = CrsfFrame::new(0xC8, CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &payload).unwrap();
        let mut out = [0u8; 10];
        assert_eq!(
            frame.write_to(&mut out),
            Err(FrameError::BufferTooSmall { needed: 26, available: 10 })
        );
    }
}
