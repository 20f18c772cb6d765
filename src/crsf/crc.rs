//! # CRC8-DVB-S2 Implementation
//!
//! CRC-8-DVB-S2 checksum calculation for CRSF protocol.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00

/// CRC-8-DVB-S2 polynomial
const CRC8_POLY: u8 = 0xD5;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Continue a CRC8-DVB-S2 calculation from `seed`
///
/// Lets a checksum be accumulated over non-contiguous pieces of a frame:
/// `crc8_dvb_s2_update(crc8_dvb_s2(a), b) == crc8_dvb_s2(a ++ b)`.
///
/// # Examples
///
/// ```
/// use crsf_rx::crsf::crc::{crc8_dvb_s2, crc8_dvb_s2_update};
///
/// let mut frame = vec![0x16u8];
/// frame.extend_from_slice(&[0u8; 22]);
///
/// let head = crc8_dvb_s2(&frame[..1]);
/// assert_eq!(crc8_dvb_s2_update(head, &frame[1..]), crc8_dvb_s2(&frame));
/// ```
pub fn crc8_dvb_s2_update(seed: u8, data: &[u8]) -> u8 {
    data.iter()
        .fold(seed, |crc, &byte| CRC8_TABLE[(crc ^ byte) as usize])
}

/// Calculate CRC8-DVB-S2 checksum using lookup table (fast)
///
/// # Arguments
///
/// * `data` - Byte slice to calculate CRC for (Type + Payload)
///
/// # Returns
///
/// * `u8` - Calculated CRC8 checksum
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    crc8_dvb_s2_update(0, data)
}

/// Bitwise CRC8-DVB-S2, used to verify the lookup table
#[cfg(test)]
fn crc8_dvb_s2_slow(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}
