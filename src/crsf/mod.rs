//! # CRSF Protocol Module
//!
//! Implementation of the Crossfire (CRSF) frame format as received by a
//! flight controller from an ExpressLRS / TBS receiver.
//!
//! This module handles:
//! - Frame layout constants and a borrowed frame view
//! - CRC8-DVB-S2 checksum calculation
//! - Frame validation and RC channel unpacking (16 channels, 11-bit resolution)
//! - RC channel encoding for loopback and tests

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod crc;
