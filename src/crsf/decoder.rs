//! # CRSF Frame Decoder
//!
//! Validates assembled CRSF frames and unpacks their payloads.
//!
//! Nothing here allocates: frames are borrowed views into the caller's
//! receive buffer and errors are plain `Copy` values.

use super::crc::crc8_dvb_s2;
use super::protocol::*;
use crate::error::FrameError;

/// Mask for one packed channel
const CHANNEL_MASK: u32 = 0x7FF;

/// Decoded payload of a validated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Packed RC channels, unpacked to 16 raw values
    RcChannels(RcChannels),

    /// Link statistics telemetry
    LinkStatistics(LinkStatistics),

    /// Any other frame type; carries no channel data
    Other(u8),
}

/// Validate a complete CRSF frame
///
/// # Arguments
///
/// * `frame` - Complete frame bytes (address, length, type, payload, crc)
///
/// # Returns
///
/// * `Result<CrsfFrame, FrameError>` - Borrowed view of the frame
///
/// # Errors
///
/// Returns error if:
/// - Frame is shorter than address + length + type + crc
/// - Length field is below type + crc, or overruns the maximum frame size
/// - Frame is shorter than its length field announces
/// - CRC over type + payload does not match
pub fn decode_frame(frame: &[u8]) -> Result<CrsfFrame<'_>, FrameError> {
    if frame.len() < CRSF_HEADER_LEN + CRSF_MIN_LENGTH_FIELD as usize {
        return Err(FrameError::TooShort { len: frame.len() });
    }

    let length = frame[CRSF_LENGTH_IDX];
    let end = CRSF_HEADER_LEN + length as usize;

    if length < CRSF_MIN_LENGTH_FIELD || end > CRSF_MAX_FRAME_LEN {
        return Err(FrameError::InvalidLength { len: length });
    }

    if frame.len() < end {
        return Err(FrameError::TooShort { len: frame.len() });
    }

    let crc_idx = end - CRSF_CRC_LEN;
    let received_crc = frame[crc_idx];
    let calculated_crc = crc8_dvb_s2(&frame[CRSF_TYPE_IDX..crc_idx]);

    if calculated_crc != received_crc {
        return Err(FrameError::CrcMismatch {
            expected: calculated_crc,
            actual: received_crc,
        });
    }

    Ok(CrsfFrame {
        address: frame[CRSF_ADDRESS_IDX],
        frame_type: frame[CRSF_TYPE_IDX],
        payload: &frame[CRSF_PAYLOAD_IDX..crc_idx],
    })
}

/// Dispatch a validated frame by type
///
/// # Errors
///
/// Returns `FrameError::PayloadSize` when a recognized type carries a
/// payload of the wrong size
pub fn decode_payload(frame: &CrsfFrame<'_>) -> Result<Payload, FrameError> {
    match frame.kind() {
        FrameType::RcChannelsPacked => {
            let packed: &[u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE] =
                frame.payload.try_into().map_err(|_| FrameError::PayloadSize {
                    len: frame.payload.len(),
                    expected: CRSF_RC_CHANNELS_PAYLOAD_SIZE,
                })?;
            Ok(Payload::RcChannels(unpack_rc_channels(packed)))
        }
        FrameType::LinkStatistics => decode_link_statistics(frame.payload).map(Payload::LinkStatistics),
        FrameType::Other(frame_type) => Ok(Payload::Other(frame_type)),
    }
}

/// Unpack 16 × 11-bit channels from an RC channels payload
///
/// Channel `i` starts at bit `11 * i` of the little-endian bitstream. Its
/// value is read from a 24-bit window of up to three bytes starting at
/// byte `11 * i / 8`, shifted right by `11 * i % 8` and masked to 11 bits.
pub fn unpack_rc_channels(payload: &[u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE]) -> RcChannels {
    let mut channels = [0u16; CRSF_NUM_CHANNELS];

    for (i, channel) in channels.iter_mut().enumerate() {
        let bit = i * CRSF_CHANNEL_BITS;
        let start = bit / 8;
        let shift = bit % 8;

        let window = payload[start] as u32
            | (payload[start + 1] as u32) << 8
            | payload.get(start + 2).map_or(0, |&b| (b as u32) << 16);

        *channel = ((window >> shift) & CHANNEL_MASK) as u16;
    }

    channels
}

/// Decode Link Statistics telemetry packet
///
/// # Arguments
///
/// * `payload` - Link Statistics payload (10 bytes)
///
/// # Returns
///
/// * `Result<LinkStatistics, FrameError>` - Decoded link statistics
pub fn decode_link_statistics(payload: &[u8]) -> Result<LinkStatistics, FrameError> {
    if payload.len() < CRSF_LINK_STATS_PAYLOAD_SIZE {
        return Err(FrameError::PayloadSize {
            len: payload.len(),
            expected: CRSF_LINK_STATS_PAYLOAD_SIZE,
        });
    }

    Ok(LinkStatistics {
        uplink_rssi_1: payload[0],
        uplink_rssi_2: payload[1],
        uplink_lq: payload[2],
        uplink_snr: payload[3] as i8,
        active_antenna: payload[4],
        rf_mode: payload[5],
        uplink_tx_power: payload[6],
        downlink_rssi: payload[7],
        downlink_lq: payload[8],
        downlink_snr: payload[9] as i8,
    })
}
