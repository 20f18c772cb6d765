//! # Channel Monitor
//!
//! Periodic JSON Lines snapshots of a receiver for logging or piping into
//! other tools. One line per snapshot:
//!
//! ```text
//! {"timestamp":"2026-10-16T12:00:00Z","status":"active","channels":[{"raw":992},...],...}
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crsf::protocol::{LinkStatistics, CRSF_NUM_CHANNELS};
use crate::error::Result;
use crate::receiver::{ChannelValue, LinkStats, LinkStatus, ReceiverHandle};

/// One monitor record
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    pub timestamp: DateTime<Utc>,
    pub status: LinkStatus,
    pub channels: [ChannelValue; CRSF_NUM_CHANNELS],
    pub link_quality: Option<LinkStatistics>,
    pub stats: LinkStats,
}

impl ChannelSnapshot {
    /// Capture the current state of `receiver`
    pub fn capture(receiver: &ReceiverHandle) -> Self {
        Self {
            timestamp: Utc::now(),
            status: receiver.link_status(),
            channels: receiver.snapshot(),
            link_quality: receiver.link_quality(),
            stats: receiver.stats(),
        }
    }

    /// Serialize as a single JSON line (no trailing newline)
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
