//! # Frame Assembler
//!
//! Byte-at-a-time reassembly of length-delimited CRSF frames into a fixed
//! buffer. The length field is bounds-checked before it sizes anything.
//!
//! A rejected attempt does not throw its bytes away: the assembler hunts
//! forward through what it already holds for the next sync byte, so a frame
//! that started inside a corrupted one is still found without waiting for
//! the line to go quiet.

use crate::crsf::protocol::{
    CRSF_ADDRESS_FLIGHT_CONTROLLER, CRSF_HEADER_LEN, CRSF_LENGTH_IDX, CRSF_MAX_FRAME_LEN,
};

/// Address byte a new frame attempt is aligned to after a rejection
const SYNC_BYTE: u8 = CRSF_ADDRESS_FLIGHT_CONTROLLER;

/// How many bytes the current frame needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Length field not seen yet
    Header,

    /// Total wire size announced by the length field
    Bytes(usize),
}

/// Result of pushing one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// Nothing more to do until the next byte
    Pending,

    /// A frame is complete; read it with [`FrameAssembler::frame`]
    Complete,

    /// Byte dropped because a complete frame has not been released yet
    Ignored,

    /// Length field announced a frame larger than the buffer; the attempt
    /// was abandoned
    Oversized,
}

/// Receive buffer and reassembly state
///
/// `filled` bytes are held; the frame under assembly always starts at
/// offset 0. After a rejection the buffer may hold more than one frame's
/// worth of bytes, which [`poll`](FrameAssembler::poll) works through.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    buf: [u8; CRSF_MAX_FRAME_LEN],
    filled: usize,
    expect: Expect,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            buf: [0; CRSF_MAX_FRAME_LEN],
            filled: 0,
            expect: Expect::Header,
        }
    }

    /// Append one byte
    ///
    /// Once `Complete` is returned the frame stays available until it is
    /// released with [`consume`](Self::consume) or [`reject`](Self::reject);
    /// bytes pushed in the meantime are dropped.
    pub fn push(&mut self, byte: u8) -> Push {
        if self.is_complete() || self.filled == CRSF_MAX_FRAME_LEN {
            return Push::Ignored;
        }

        self.buf[self.filled] = byte;
        self.filled += 1;
        self.poll()
    }

    /// Examine bytes already held
    ///
    /// Call after releasing a frame, and after `Oversized`, until it
    /// returns `Pending`.
    pub fn poll(&mut self) -> Push {
        if self.expect == Expect::Header {
            if self.filled <= CRSF_LENGTH_IDX {
                return Push::Pending;
            }

            let total = CRSF_HEADER_LEN + self.buf[CRSF_LENGTH_IDX] as usize;
            if total > CRSF_MAX_FRAME_LEN {
                self.hunt();
                return Push::Oversized;
            }
            self.expect = Expect::Bytes(total);
        }

        if self.is_complete() {
            Push::Complete
        } else {
            Push::Pending
        }
    }

    /// Bytes of the frame assembled so far
    pub fn frame(&self) -> &[u8] {
        match self.expect {
            Expect::Bytes(total) => &self.buf[..total.min(self.filled)],
            Expect::Header => &self.buf[..self.filled],
        }
    }

    /// Release a complete frame, keeping any bytes held after it
    pub fn consume(&mut self) {
        let len = self.frame().len();
        self.drop_front(len);
    }

    /// Release a frame that failed validation
    ///
    /// Its first byte is dropped and the rest is searched for the next
    /// sync byte; everything before it goes too.
    pub fn reject(&mut self) {
        self.hunt();
    }

    /// Drop everything held and wait for a new header
    pub fn reset(&mut self) {
        self.filled = 0;
        self.expect = Expect::Header;
    }

    /// Bytes held
    pub fn position(&self) -> usize {
        self.filled
    }

    /// Total frame size announced by the length field, once known
    #[cfg(test)]
    fn bytes_expected(&self) -> Option<usize> {
        match self.expect {
            Expect::Bytes(total) => Some(total),
            Expect::Header => None,
        }
    }

    /// Whether a frame is partially assembled
    pub fn in_progress(&self) -> bool {
        self.filled > 0
    }

    /// Free space left in the receive buffer
    pub fn headroom(&self) -> usize {
        CRSF_MAX_FRAME_LEN - self.filled
    }

    fn is_complete(&self) -> bool {
        matches!(self.expect, Expect::Bytes(total) if self.filled >= total)
    }

    fn hunt(&mut self) {
        let skip = self
            .buf
            .get(1..self.filled)
            .and_then(|rest| rest.iter().position(|&b| b == SYNC_BYTE))
            .map_or(self.filled, |offset| offset + 1);
        self.drop_front(skip);
    }

    fn drop_front(&mut self, count: usize) {
        self.buf.copy_within(count..self.filled, 0);
        self.filled -= count;
        self.expect = Expect::Header;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
