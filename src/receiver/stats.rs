//! Link counters, updated from the byte and tick paths and read anywhere.

use std::sync::atomic::{AtomicU32, Ordering};

/// Point-in-time copy of the link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct LinkStats {
    /// Frames that passed CRC validation, any type
    pub valid_frames: u32,

    /// RC channel frames written to the channel store
    pub rc_frames: u32,

    /// Frames dropped on CRC mismatch
    pub crc_errors: u32,

    /// Frames dropped for a bad length or payload size
    pub malformed_frames: u32,

    /// Length fields announcing more than the receive buffer holds
    pub oversized_frames: u32,

    /// Partial frames dropped by the resync timeout
    pub resyncs: u32,

    /// Transitions into failsafe
    pub failsafe_events: u32,
}

#[derive(Debug, Default)]
pub(crate) struct LinkCounters {
    pub valid_frames: AtomicU32,
    pub rc_frames: AtomicU32,
    pub crc_errors: AtomicU32,
    pub malformed_frames: AtomicU32,
    pub oversized_frames: AtomicU32,
    pub resyncs: AtomicU32,
    pub failsafe_events: AtomicU32,
}

impl LinkCounters {
    pub fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LinkStats {
        LinkStats {
            valid_frames: self.valid_frames.load(Ordering::Relaxed),
            rc_frames: self.rc_frames.load(Ordering::Relaxed),
            crc_errors: self.crc_errors.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            oversized_frames: self.oversized_frames.load(Ordering::Relaxed),
            resyncs: self.resyncs.load(Ordering::Relaxed),
            failsafe_events: self.failsafe_events.load(Ordering::Relaxed),
        }
    }
}
