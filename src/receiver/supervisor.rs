//! # Failsafe Supervisor
//!
//! Tick-driven timers for resynchronization and link loss. The supervisor
//! only counts and reports; the driver applies the resulting actions.

/// Tick thresholds for the two supervisor checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Silent ticks after which a partial frame is dropped
    pub resync_ticks: u16,

    /// Ticks without a valid frame after which channels read `Timeout`
    pub failsafe_ticks: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            resync_ticks: 3,
            failsafe_ticks: 100,
        }
    }
}

/// Actions requested by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Reset the frame assembler
    pub resync: bool,

    /// Force every channel to `Timeout`
    pub failsafe: bool,
}

/// Elapsed-tick counters
#[derive(Debug, Clone)]
pub struct Supervisor {
    thresholds: Thresholds,
    since_last_byte: u16,
    since_last_valid_frame: u16,
}

impl Supervisor {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            since_last_byte: 0,
            since_last_valid_frame: 0,
        }
    }

    /// Advance both counters by one tick
    ///
    /// Each check fires on every tick its counter exceeds the threshold,
    /// not only on the first one.
    pub fn tick(&mut self) -> TickOutcome {
        self.since_last_byte = self.since_last_byte.saturating_add(1);
        self.since_last_valid_frame = self.since_last_valid_frame.saturating_add(1);

        TickOutcome {
            resync: self.since_last_byte > self.thresholds.resync_ticks,
            failsafe: self.since_last_valid_frame > self.thresholds.failsafe_ticks,
        }
    }

    /// A byte arrived on the receive path
    pub fn byte_received(&mut self) {
        self.since_last_byte = 0;
    }

    /// A frame passed CRC validation
    pub fn frame_validated(&mut self) {
        self.since_last_valid_frame = 0;
    }

    #[cfg(test)]
    fn since_last_byte(&self) -> u16 {
        self.since_last_byte
    }

    pub fn since_last_valid_frame(&self) -> u16 {
        self.since_last_valid_frame
    }

    /// Whether the failsafe condition currently holds
    #[cfg(test)]
    fn in_failsafe(&self) -> bool {
        self.since_last_valid_frame > self.thresholds.failsafe_ticks
    }
}
