//! # Channel Store
//!
//! Sixteen raw channel slots shared between the byte-delivery path, the
//! tick path and any number of readers.
//!
//! Each slot is an `AtomicU16`, so a single channel is never torn. A full
//! frame update writes the slots one after another; a reader racing that
//! update may see some channels from the previous frame and some from the
//! new one. Consecutive frames differ by stick motion only, so such a mix
//! is control noise. Use [`ChannelStore::snapshot`] to read all channels
//! with the same caveat.

use std::sync::atomic::{AtomicU16, Ordering};

use crate::crsf::protocol::{RcChannels, CRSF_CHANNEL_VALUE_MAX, CRSF_NUM_CHANNELS};
use crate::error::ReadError;

/// Slot encoding of [`ChannelValue::NoDriver`]
const SLOT_NO_DRIVER: u16 = 0xFFFF;

/// Slot encoding of [`ChannelValue::Timeout`]
const SLOT_TIMEOUT: u16 = 0xFFFE;

/// Value held by one channel slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelValue {
    /// Raw 11-bit value from the last valid frame
    Raw(u16),

    /// No frame was ever decoded into this slot
    NoDriver,

    /// Link lost: no valid frame within the failsafe window
    Timeout,
}

impl ChannelValue {
    /// The raw value, or `None` for either sentinel
    pub fn raw(self) -> Option<u16> {
        match self {
            ChannelValue::Raw(value) => Some(value),
            ChannelValue::NoDriver | ChannelValue::Timeout => None,
        }
    }

    /// Whether this value may be used for control
    pub fn is_usable(self) -> bool {
        self.raw().is_some()
    }

    fn to_slot(self) -> u16 {
        match self {
            ChannelValue::Raw(value) => value.min(CRSF_CHANNEL_VALUE_MAX),
            ChannelValue::NoDriver => SLOT_NO_DRIVER,
            ChannelValue::Timeout => SLOT_TIMEOUT,
        }
    }

    fn from_slot(slot: u16) -> Self {
        match slot {
            SLOT_NO_DRIVER => ChannelValue::NoDriver,
            SLOT_TIMEOUT => ChannelValue::Timeout,
            value => ChannelValue::Raw(value),
        }
    }
}

/// Lock-free store of the latest channel values
#[derive(Debug)]
pub struct ChannelStore {
    slots: [AtomicU16; CRSF_NUM_CHANNELS],
}

impl ChannelStore {
    /// Create a store with every channel set to `NoDriver`
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU16::new(SLOT_NO_DRIVER)),
        }
    }

    /// Read one channel
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidChannel` if `index` is not in 0..16
    pub fn read(&self, index: usize) -> Result<ChannelValue, ReadError> {
        self.slots
            .get(index)
            .map(|slot| ChannelValue::from_slot(slot.load(Ordering::Acquire)))
            .ok_or(ReadError::InvalidChannel(index))
    }

    /// Read all channels, slot by slot
    pub fn snapshot(&self) -> [ChannelValue; CRSF_NUM_CHANNELS] {
        std::array::from_fn(|i| ChannelValue::from_slot(self.slots[i].load(Ordering::Acquire)))
    }

    /// Overwrite every slot with the channels of one decoded frame
    pub fn store_frame(&self, channels: &RcChannels) {
        for (slot, &value) in self.slots.iter().zip(channels.iter()) {
            slot.store(ChannelValue::Raw(value).to_slot(), Ordering::Release);
        }
    }

    /// Set every slot to the same value
    pub fn set_all(&self, value: ChannelValue) {
        let slot_value = value.to_slot();
        for slot in &self.slots {
            slot.store(slot_value, Ordering::Release);
        }
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new()
    }
}
