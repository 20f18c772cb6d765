//! # CRSF Packet Encoder
//!
//! Encodes RC channels into CRSF protocol frames. The receiver never
//! encodes on its own; this is the transmitter side used by the loopback
//! mode of the monitor and by tests.

use super::protocol::*;
use crate::error::FrameError;

/// Encode RC channels into a complete CRSF frame
///
/// # Arguments
///
/// * `channels` - Array of 16 channel values (11-bit: 0-2047)
///
/// # Returns
///
/// * `[u8; 26]` - Complete frame: address + length + type + 22-byte payload + crc
///
/// # Examples
///
/// ```
/// use crsf_rx::crsf::encoder::encode_rc_channels_frame;
///
/// let channels = [992u16; 16]; // All channels at stick center
/// let frame = encode_rc_channels_frame(&channels);
/// assert_eq!(frame.len(), 26);
/// assert_eq!(frame[2], 0x16);
/// ```
pub fn encode_rc_channels_frame(channels: &RcChannels) -> [u8; CRSF_RC_CHANNELS_FRAME_SIZE] {
    let payload = encode_rc_channels_payload(channels);
    let mut frame = [0u8; CRSF_RC_CHANNELS_FRAME_SIZE];

    let written = CrsfFrame {
        address: CRSF_ADDRESS_FLIGHT_CONTROLLER,
        frame_type: CRSF_FRAMETYPE_RC_CHANNELS_PACKED,
        payload: &payload,
    }
    .write_to(&mut frame);
    debug_assert_eq!(written, Ok(CRSF_RC_CHANNELS_FRAME_SIZE));

    frame
}

/// Encode an arbitrary frame
///
/// # Errors
///
/// Returns `FrameError::PayloadSize` if payload exceeds CRSF_MAX_PAYLOAD_SIZE
pub fn encode_frame(address: u8, frame_type: u8, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let frame = CrsfFrame::new(address, frame_type, payload)?;
    let mut out = vec![0u8; frame.wire_len()];
    frame.write_to(&mut out)?;
    Ok(out)
}

/// Encode RC channels into payload (22 bytes)
///
/// Packs 16 channels (11 bits each) into 22 bytes using bit packing.
/// Channels are packed as a continuous bitstream, LSB first.
///
/// # Algorithm
///
/// Each channel is 11 bits (0-2047). Channels are packed LSB-first:
/// ```text
/// Byte 0: Ch1[0:7]
/// Byte 1: Ch1[8:10] | Ch2[0:4]
/// Byte 2: Ch2[5:10] | Ch3[0:1]
/// ...
/// ```
pub fn encode_rc_channels_payload(channels: &RcChannels) -> [u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE] {
    let mut payload = [0u8; CRSF_RC_CHANNELS_PAYLOAD_SIZE];
    let mut bit_index = 0;

    for &channel in channels.iter() {
        let value = clamp_channel_value(channel);

        for bit in 0..CRSF_CHANNEL_BITS {
            if (value >> bit) & 1 == 1 {
                payload[bit_index / 8] |= 1 << (bit_index % 8);
            }
            bit_index += 1;
        }
    }

    payload
}

/// Encode a Link Statistics payload (10 bytes)
pub fn encode_link_statistics(stats: &LinkStatistics) -> [u8; CRSF_LINK_STATS_PAYLOAD_SIZE] {
    [
        stats.uplink_rssi_1,
        stats.uplink_rssi_2,
        stats.uplink_lq,
        stats.uplink_snr as u8,
        stats.active_antenna,
        stats.rf_mode,
        stats.uplink_tx_power,
        stats.downlink_rssi,
        stats.downlink_lq,
        stats.downlink_snr as u8,
    ]
}

/// Clamp a channel value to valid CRSF range (0-2047)
pub fn clamp_channel_value(value: u16) -> u16 {
    value.min(CRSF_CHANNEL_VALUE_MAX)
}
