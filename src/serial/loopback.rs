//! Local frame source for running the receiver without hardware.
//!
//! Writes RC channel frames at a fixed rate into any `AsyncWrite`, usually
//! one end of a `tokio::io::duplex` pipe whose other end feeds a
//! [`SerialTransport`](super::SerialTransport).

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{interval, Duration};
use tracing::debug;

use crate::crsf::encoder::encode_rc_channels_frame;
use crate::crsf::protocol::{
    RcChannels, CRSF_CHANNEL_VALUE_MID, CRSF_NUM_CHANNELS,
};
use crate::error::{CrsfRxError, Result};

/// Default frame rate in Hz (ELRS standard)
pub const LOOPBACK_RATE_HZ: u32 = 250;

/// Stick travel around center, in raw units (172..1811 is the 988-2012us range)
const SWEEP_AMPLITUDE: u16 = 819;

/// Channels of the `n`-th generated frame
///
/// The four stick channels sweep in a triangle wave, phase-shifted by a
/// quarter period each; all other channels stay centered.
pub fn sweep_channels(n: u64) -> RcChannels {
    const PERIOD: u64 = 4 * SWEEP_AMPLITUDE as u64;

    let mut channels = [CRSF_CHANNEL_VALUE_MID; CRSF_NUM_CHANNELS];
    for (axis, channel) in channels.iter_mut().take(4).enumerate() {
        let phase = (n * 8 + axis as u64 * PERIOD / 4) % PERIOD;
        let offset = if phase < PERIOD / 2 {
            phase as i32 - SWEEP_AMPLITUDE as i32
        } else {
            (PERIOD - phase) as i32 - SWEEP_AMPLITUDE as i32
        };
        *channel = (CRSF_CHANNEL_VALUE_MID as i32 + offset) as u16;
    }
    channels
}

/// Write `count` frames (or forever if `None`) at `rate_hz`
///
/// # Errors
///
/// Returns `CrsfRxError::Serial` if the writer fails
pub async fn run_source<W>(mut writer: W, rate_hz: u32, count: Option<u64>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let period = Duration::from_micros(1_000_000 / rate_hz.max(1) as u64);
    let mut ticker = interval(period);
    let mut n: u64 = 0;

    while count.map_or(true, |count| n < count) {
        ticker.tick().await;

        let frame = encode_rc_channels_frame(&sweep_channels(n));
        writer
            .write_all(&frame)
            .await
            .map_err(|e| CrsfRxError::Serial(format!("Loopback write failed: {}", e)))?;

        n += 1;
    }

    writer.flush().await?;
    debug!("Loopback source wrote {} frames", n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::decoder::{decode_frame, decode_payload, Payload};
    use crate::crsf::protocol::{CRSF_CHANNEL_VALUE_MAX, CRSF_RC_CHANNELS_FRAME_SIZE};
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_sweep_stays_in_range() {
        for n in 0..2000 {
            let channels = sweep_channels(n);
            for &value in &channels[..4] {
                assert!(value >= CRSF_CHANNEL_VALUE_MID - SWEEP_AMPLITUDE);
                assert!(value <= CRSF_CHANNEL_VALUE_MID + SWEEP_AMPLITUDE);
                assert!(value <= CRSF_CHANNEL_VALUE_MAX);
            }
            assert!(channels[4..].iter().all(|&v| v == CRSF_CHANNEL_VALUE_MID));
        }
    }

    #[test]
    fn test_sweep_moves() {
        assert_ne!(sweep_channels(0)[0], sweep_channels(10)[0]);
        // Axes are out of phase
        assert_ne!(sweep_channels(0)[0], sweep_channels(0)[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_writes_valid_frames() {
        let (writer, mut reader) = tokio::io::duplex(1024);

        run_source(writer, LOOPBACK_RATE_HZ, Some(3)).await.unwrap();

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await.unwrap();
        assert_eq!(bytes.len(), 3 * CRSF_RC_CHANNELS_FRAME_SIZE);

        for (n, chunk) in bytes.chunks(CRSF_RC_CHANNELS_FRAME_SIZE).enumerate() {
            let frame = decode_frame(chunk).unwrap();
            assert_eq!(
                decode_payload(&frame),
                Ok(Payload::RcChannels(sweep_channels(n as u64)))
            );
        }
    }
}
