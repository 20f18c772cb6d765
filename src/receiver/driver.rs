//! # Receiver Driver
//!
//! Binds the frame assembler, decoder, failsafe supervisor and channel
//! store into one receiver instance and hands out a [`ReceiverHandle`].
//!
//! Byte delivery and ticks both mutate the assembler, so the assembler and
//! supervisor sit behind one mutex that is held only for the bounded work
//! of a single call. Channel reads never take that lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, trace, warn};

use super::assembler::{FrameAssembler, Push};
use super::channels::{ChannelStore, ChannelValue};
use super::stats::{LinkCounters, LinkStats};
use super::supervisor::{Supervisor, Thresholds};
use super::transport::Transport;
use crate::config::ReceiverConfig;
use crate::crsf::decoder::{decode_frame, decode_payload, Payload};
use crate::crsf::protocol::{LinkStatistics, CRSF_NUM_CHANNELS};
use crate::error::{BindError, FrameError, ReadError};

/// Coarse link state for consumers and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// No valid frame decoded since initialization
    NoData,

    /// Valid frames are arriving
    Active,

    /// Frames stopped; channels read `Timeout`
    Failsafe,
}

/// Result of one byte delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Bytes taken from the input (always the whole input)
    pub consumed: usize,

    /// Free space left in the receive buffer
    pub headroom: usize,

    /// A valid frame was decoded; consumers may want to wake up
    pub woke_consumer: bool,
}

/// State touched by both the byte and the tick path
#[derive(Debug)]
struct Link {
    assembler: FrameAssembler,
    supervisor: Supervisor,
    link_quality: Option<LinkStatistics>,
}

#[derive(Debug)]
struct Shared {
    link: Mutex<Link>,
    channels: ChannelStore,
    counters: LinkCounters,
    seen_frame: AtomicBool,
    failsafe: AtomicBool,
}

/// Handle to one receiver instance
///
/// Cloning is cheap; all clones refer to the same receiver.
#[derive(Debug, Clone)]
pub struct ReceiverHandle {
    shared: Arc<Shared>,
}

/// Create a receiver and bind it to `transport`
///
/// Registers the supervisor tick first, then the receive path. If the
/// receive binding is refused the tick registration is withdrawn, so a
/// failed call leaves nothing registered.
///
/// # Errors
///
/// Returns `BindError` if the transport refuses either registration
pub fn init<T: Transport + ?Sized>(
    transport: &mut T,
    config: &ReceiverConfig,
) -> Result<ReceiverHandle, BindError> {
    let handle = ReceiverHandle::new(config.thresholds());

    transport
        .register_tick(handle.clone())
        .map_err(BindError::Tick)?;

    if let Err(e) = transport.bind_rx(handle.clone()) {
        warn!("Failed to bind receive path: {}", e);
        transport.unregister_tick();
        return Err(BindError::Rx(e));
    }

    info!(
        "CRSF receiver bound (resync after {} ticks, failsafe after {} ticks)",
        config.resync_ticks, config.failsafe_ticks
    );
    Ok(handle)
}

impl ReceiverHandle {
    /// Allocate receiver state with every channel at `NoDriver`
    pub(crate) fn new(thresholds: Thresholds) -> Self {
        Self {
            shared: Arc::new(Shared {
                link: Mutex::new(Link {
                    assembler: FrameAssembler::new(),
                    supervisor: Supervisor::new(thresholds),
                    link_quality: None,
                }),
                channels: ChannelStore::new(),
                counters: LinkCounters::default(),
                seen_frame: AtomicBool::new(false),
                failsafe: AtomicBool::new(false),
            }),
        }
    }

    /// Feed received bytes
    ///
    /// Every byte is consumed. Complete frames are validated and decoded as
    /// soon as their last byte arrives; a frame that fails validation is
    /// searched for the start of the next one.
    pub fn deliver(&self, bytes: &[u8]) -> Delivery {
        let mut guard = self.shared.lock_link();
        let link = &mut *guard;
        let mut woke_consumer = false;

        for &byte in bytes {
            link.supervisor.byte_received();

            // A rejected attempt can expose further frames in bytes already held
            let mut step = link.assembler.push(byte);
            loop {
                match step {
                    Push::Pending | Push::Ignored => break,
                    Push::Oversized => {
                        LinkCounters::bump(&self.shared.counters.oversized_frames);
                        debug!("Abandoning frame with oversized length field");
                    }
                    Push::Complete => {
                        if self.shared.complete_frame(link) {
                            woke_consumer = true;
                            link.assembler.consume();
                        } else {
                            link.assembler.reject();
                        }
                    }
                }
                step = link.assembler.poll();
            }
        }

        Delivery {
            consumed: bytes.len(),
            headroom: link.assembler.headroom(),
            woke_consumer,
        }
    }

    /// Advance the supervisor by one tick
    pub fn tick(&self) {
        let mut guard = self.shared.lock_link();
        let link = &mut *guard;
        let outcome = link.supervisor.tick();

        if outcome.resync && link.assembler.in_progress() {
            debug!(
                "Resync: dropping partial frame ({} bytes)",
                link.assembler.position()
            );
            link.assembler.reset();
            LinkCounters::bump(&self.shared.counters.resyncs);
        }

        if outcome.failsafe {
            self.shared.channels.set_all(ChannelValue::Timeout);

            if !self.shared.failsafe.swap(true, Ordering::AcqRel) {
                LinkCounters::bump(&self.shared.counters.failsafe_events);
                warn!(
                    "CRSF link lost: no valid frame for {} ticks, failsafe active",
                    link.supervisor.since_last_valid_frame()
                );
            }
        }
    }

    /// Read one channel
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidChannel` if `channel` is not in 0..16
    pub fn read(&self, channel: usize) -> Result<ChannelValue, ReadError> {
        self.shared.channels.read(channel)
    }

    /// Read all channels (may mix two consecutive frames)
    pub fn snapshot(&self) -> [ChannelValue; CRSF_NUM_CHANNELS] {
        self.shared.channels.snapshot()
    }

    pub fn link_status(&self) -> LinkStatus {
        if !self.shared.seen_frame.load(Ordering::Acquire) {
            LinkStatus::NoData
        } else if self.shared.failsafe.load(Ordering::Acquire) {
            LinkStatus::Failsafe
        } else {
            LinkStatus::Active
        }
    }

    /// Latest link statistics reported by the receiver, if any
    pub fn link_quality(&self) -> Option<LinkStatistics> {
        self.shared.lock_link().link_quality
    }

    pub fn stats(&self) -> LinkStats {
        self.shared.counters.snapshot()
    }

    /// Ticks since the last valid frame
    pub fn since_last_valid_frame(&self) -> u16 {
        self.shared.lock_link().supervisor.since_last_valid_frame()
    }
}

impl Shared {
    fn lock_link(&self) -> MutexGuard<'_, Link> {
        // Nothing under this lock panics; recover the state if a caller did
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and apply the frame held by the assembler
    ///
    /// Returns true if the frame passed CRC validation.
    fn complete_frame(&self, link: &mut Link) -> bool {
        let frame = match decode_frame(link.assembler.frame()) {
            Ok(frame) => frame,
            Err(e) => {
                let counter = match e {
                    FrameError::CrcMismatch { .. } => &self.counters.crc_errors,
                    _ => &self.counters.malformed_frames,
                };
                LinkCounters::bump(counter);
                debug!("Dropping frame: {}", e);
                return false;
            }
        };

        // Any CRC-valid frame proves the link is alive
        link.supervisor.frame_validated();
        LinkCounters::bump(&self.counters.valid_frames);

        match decode_payload(&frame) {
            Ok(Payload::RcChannels(channels)) => {
                self.channels.store_frame(&channels);
                LinkCounters::bump(&self.counters.rc_frames);
            }
            Ok(Payload::LinkStatistics(stats)) => {
                link.link_quality = Some(stats);
            }
            Ok(Payload::Other(frame_type)) => {
                trace!("Ignoring frame type 0x{:02X}", frame_type);
            }
            Err(e) => {
                LinkCounters::bump(&self.counters.malformed_frames);
                debug!("Frame type 0x{:02X} rejected: {}", frame.frame_type, e);
            }
        }

        self.seen_frame.store(true, Ordering::Release);
        if self.failsafe.swap(false, Ordering::AcqRel) {
            info!("CRSF link restored");
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::encoder::{encode_frame, encode_link_statistics, encode_rc_channels_frame};
    use crate::crsf::protocol::*;
    use crate::error::TransportError;
    use crate::receiver::transport::MockTransport;

    const RESYNC: u16 = 3;
    const FAILSAFE: u16 = 32;

    fn receiver() -> ReceiverHandle {
        ReceiverHandle::new(Thresholds {
            resync_ticks: RESYNC,
            failsafe_ticks: FAILSAFE,
        })
    }

    fn ticks(rx: &ReceiverHandle, n: u16) {
        for _ in 0..n {
            rx.tick();
        }
    }

    fn raw(channels: &RcChannels) -> [ChannelValue; CRSF_NUM_CHANNELS] {
        channels.map(ChannelValue::Raw)
    }

    #[test]
    fn test_initial_state() {
        let rx = receiver();
        assert_eq!(rx.snapshot(), [ChannelValue::NoDriver; CRSF_NUM_CHANNELS]);
        assert_eq!(rx.link_status(), LinkStatus::NoData);
        assert_eq!(rx.link_quality(), None);
        assert_eq!(rx.stats(), LinkStats::default());
    }

    #[test]
    fn test_mid_payload_decodes_to_992() {
        let payload = [
            0xE0, 0x03, 0x1F, 0xF8, 0xC0, 0x07, 0x3E, 0xF0, 0x81, 0x0F, 0x7C,
            0xE0, 0x03, 0x1F, 0xF8, 0xC0, 0x07, 0x3E, 0xF0, 0x81, 0x0F, 0x7C,
        ];
        let frame = encode_frame(0xC8, CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &payload).unwrap();
        let rx = receiver();

        let delivery = rx.deliver(&frame);

        assert_eq!(delivery.consumed, 26);
        assert!(delivery.woke_consumer);
        assert_eq!(rx.snapshot(), [ChannelValue::Raw(992); CRSF_NUM_CHANNELS]);
        assert_eq!(rx.link_status(), LinkStatus::Active);
    }

    #[test]
    fn test_round_trip_through_receiver() {
        let channels: RcChannels = [0, 2047, 1, 2046, 992, 1024, 172, 1811, 3, 500, 1500, 2000, 7, 77, 777, 1777];
        let rx = receiver();

        rx.deliver(&encode_rc_channels_frame(&channels));

        assert_eq!(rx.snapshot(), raw(&channels));
        for (i, &value) in channels.iter().enumerate() {
            assert_eq!(rx.read(i).unwrap().raw(), Some(value));
        }
    }

    #[test]
    fn test_byte_at_a_time_delivery() {
        let channels = [1234u16; CRSF_NUM_CHANNELS];
        let frame = encode_rc_channels_frame(&channels);
        let rx = receiver();

        for (i, byte) in frame.iter().enumerate() {
            let delivery = rx.deliver(std::slice::from_ref(byte));
            assert_eq!(delivery.consumed, 1);
            assert_eq!(delivery.woke_consumer, i == frame.len() - 1);
        }

        assert_eq!(rx.snapshot(), raw(&channels));
    }

    #[test]
    fn test_back_to_back_frames_in_one_delivery() {
        let first = encode_rc_channels_frame(&[100; CRSF_NUM_CHANNELS]);
        let second = encode_rc_channels_frame(&[1900; CRSF_NUM_CHANNELS]);
        let mut bytes = first.to_vec();
        bytes.extend_from_slice(&second);
        let rx = receiver();

        let delivery = rx.deliver(&bytes);

        assert_eq!(delivery.consumed, 52);
        assert_eq!(delivery.headroom, CRSF_MAX_FRAME_LEN);
        assert_eq!(rx.snapshot(), [ChannelValue::Raw(1900); CRSF_NUM_CHANNELS]);
        assert_eq!(rx.stats().rc_frames, 2);
    }

    #[test]
    fn test_headroom_tracks_partial_frame() {
        let frame = encode_rc_channels_frame(&[0; CRSF_NUM_CHANNELS]);
        let rx = receiver();

        let delivery = rx.deliver(&frame[..10]);
        assert_eq!(delivery.headroom, CRSF_MAX_FRAME_LEN - 10);
        assert!(!delivery.woke_consumer);
    }

    #[test]
    fn test_any_payload_byte_flip_leaves_channels_unchanged() {
        let good = [1500u16; CRSF_NUM_CHANNELS];
        let frame = encode_rc_channels_frame(&[200; CRSF_NUM_CHANNELS]);

        for idx in CRSF_PAYLOAD_IDX..CRSF_PAYLOAD_IDX + CRSF_RC_CHANNELS_PAYLOAD_SIZE {
            let rx = receiver();
            rx.deliver(&encode_rc_channels_frame(&good));
            ticks(&rx, 5);

            let mut corrupted = frame;
            corrupted[idx] ^= 0x40;
            let delivery = rx.deliver(&corrupted);

            assert!(!delivery.woke_consumer);
            assert_eq!(rx.snapshot(), raw(&good), "flip at byte {} changed channels", idx);
            assert!(rx.stats().crc_errors >= 1);
            assert_eq!(rx.stats().valid_frames, 1);
            // A bad frame does not count as link activity
            assert_eq!(rx.since_last_valid_frame(), 5);
        }
    }

    #[test]
    fn test_resync_after_garbage() {
        let channels = [1700u16; CRSF_NUM_CHANNELS];
        let rx = receiver();

        rx.deliver(&[0xC8, 0x18, 0x16, 0x12, 0x34, 0x56]);
        ticks(&rx, RESYNC + 1);
        rx.deliver(&encode_rc_channels_frame(&channels));

        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.stats().resyncs, 1);
        assert_eq!(rx.stats().crc_errors, 0);
    }

    #[test]
    fn test_garbage_without_resync_recovers_next_frame() {
        // The partial frame swallows the head of the next one, fails its CRC,
        // and the next frame is found again inside the held bytes
        let channels = [1700u16; CRSF_NUM_CHANNELS];
        let rx = receiver();

        rx.deliver(&[0xC8, 0x18, 0x16, 0x12, 0x34, 0x56]);
        ticks(&rx, RESYNC);
        let delivery = rx.deliver(&encode_rc_channels_frame(&channels));

        assert!(delivery.woke_consumer);
        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.stats().resyncs, 0);
        assert_eq!(rx.stats().crc_errors, 1);
    }

    #[test]
    fn test_failsafe_activation() {
        let channels = [1100u16; CRSF_NUM_CHANNELS];
        let rx = receiver();
        rx.deliver(&encode_rc_channels_frame(&channels));

        ticks(&rx, FAILSAFE);
        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.link_status(), LinkStatus::Active);

        rx.tick();
        assert_eq!(rx.snapshot(), [ChannelValue::Timeout; CRSF_NUM_CHANNELS]);
        assert_eq!(rx.link_status(), LinkStatus::Failsafe);
        assert_eq!(rx.stats().failsafe_events, 1);

        // Re-applied every tick, counted once
        ticks(&rx, 10);
        assert_eq!(rx.read(7), Ok(ChannelValue::Timeout));
        assert_eq!(rx.stats().failsafe_events, 1);
    }

    #[test]
    fn test_failsafe_without_any_frame() {
        let rx = receiver();
        ticks(&rx, FAILSAFE + 1);

        assert_eq!(rx.snapshot(), [ChannelValue::Timeout; CRSF_NUM_CHANNELS]);
        assert_eq!(rx.link_status(), LinkStatus::NoData);
    }

    #[test]
    fn test_failsafe_recovery() {
        let rx = receiver();
        rx.deliver(&encode_rc_channels_frame(&[1100; CRSF_NUM_CHANNELS]));
        ticks(&rx, FAILSAFE + 5);
        assert_eq!(rx.link_status(), LinkStatus::Failsafe);

        let channels = [1300u16; CRSF_NUM_CHANNELS];
        rx.deliver(&encode_rc_channels_frame(&channels));

        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.since_last_valid_frame(), 0);
        assert_eq!(rx.link_status(), LinkStatus::Active);

        // Counter restarted: a full window passes before failsafe again
        ticks(&rx, FAILSAFE);
        assert_eq!(rx.snapshot(), raw(&channels));
    }

    #[test]
    fn test_garbage_bytes_do_not_prevent_failsafe() {
        let rx = receiver();
        rx.deliver(&encode_rc_channels_frame(&[1100; CRSF_NUM_CHANNELS]));

        for _ in 0..=FAILSAFE {
            rx.deliver(&[0x00]);
            rx.tick();
        }

        assert_eq!(rx.snapshot(), [ChannelValue::Timeout; CRSF_NUM_CHANNELS]);
    }

    #[test]
    fn test_other_frame_types_keep_link_alive() {
        let channels = [900u16; CRSF_NUM_CHANNELS];
        let rx = receiver();
        rx.deliver(&encode_rc_channels_frame(&channels));

        let heartbeat = encode_frame(0xC8, 0x29, &[0x01]).unwrap();
        for _ in 0..4 {
            ticks(&rx, FAILSAFE - 1);
            assert!(rx.deliver(&heartbeat).woke_consumer);
        }

        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.stats().valid_frames, 5);
        assert_eq!(rx.stats().rc_frames, 1);
    }

    #[test]
    fn test_link_statistics_frame_updates_quality() {
        let stats = LinkStatistics {
            uplink_rssi_1: 60,
            uplink_rssi_2: 62,
            uplink_lq: 100,
            uplink_snr: 9,
            active_antenna: 0,
            rf_mode: 4,
            uplink_tx_power: 2,
            downlink_rssi: 55,
            downlink_lq: 98,
            downlink_snr: 7,
        };
        let frame = encode_frame(
            0xC8,
            CRSF_FRAMETYPE_LINK_STATISTICS,
            &encode_link_statistics(&stats),
        )
        .unwrap();
        let rx = receiver();

        rx.deliver(&frame);

        assert_eq!(rx.link_quality(), Some(stats));
        assert_eq!(rx.snapshot(), [ChannelValue::NoDriver; CRSF_NUM_CHANNELS]);
        assert_eq!(rx.link_status(), LinkStatus::Active);
    }

    #[test]
    fn test_rc_frame_with_wrong_payload_size_keeps_channels() {
        let channels = [1000u16; CRSF_NUM_CHANNELS];
        let rx = receiver();
        rx.deliver(&encode_rc_channels_frame(&channels));

        let short = encode_frame(0xC8, CRSF_FRAMETYPE_RC_CHANNELS_PACKED, &[0xFF; 20]).unwrap();
        rx.deliver(&short);

        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.stats().malformed_frames, 1);
    }

    #[test]
    fn test_valid_frame_right_after_oversized_header() {
        let channels = [1600u16; CRSF_NUM_CHANNELS];
        let rx = receiver();

        let bogus = [0xC8, 0xFF, CRSF_FRAMETYPE_RC_CHANNELS_PACKED];
        let delivery = rx.deliver(&bogus);

        assert_eq!(delivery.consumed, bogus.len());
        assert!(!delivery.woke_consumer);
        assert_eq!(rx.stats().oversized_frames, 1);

        // No quiet gap: the frame follows immediately
        let delivery = rx.deliver(&encode_rc_channels_frame(&channels));

        assert!(delivery.woke_consumer);
        assert_eq!(delivery.headroom, CRSF_MAX_FRAME_LEN);
        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.stats().valid_frames, 1);
        assert_eq!(rx.stats().crc_errors, 0);
    }

    #[test]
    fn test_continuous_stream_survives_corrupt_length() {
        let rx = receiver();
        rx.deliver(&encode_rc_channels_frame(&[1000; CRSF_NUM_CHANNELS]));
        rx.deliver(&[0xC8, 0xFF]);

        // Frames keep arriving with gaps too short for a resync
        let channels = [1200u16; CRSF_NUM_CHANNELS];
        for _ in 0..200 {
            ticks(&rx, RESYNC);
            rx.deliver(&encode_rc_channels_frame(&channels));
        }

        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.link_status(), LinkStatus::Active);
        assert_eq!(rx.stats().valid_frames, 201);
        assert_eq!(rx.stats().resyncs, 0);
        assert_eq!(rx.stats().failsafe_events, 0);
    }

    #[test]
    fn test_continuous_stream_realigns_after_truncated_frame() {
        let rx = receiver();
        let first = encode_rc_channels_frame(&[1000; CRSF_NUM_CHANNELS]);
        rx.deliver(&first);
        rx.deliver(&first[..13]);

        let channels = [1200u16; CRSF_NUM_CHANNELS];
        for _ in 0..50 {
            ticks(&rx, RESYNC);
            rx.deliver(&encode_rc_channels_frame(&channels));
        }

        // Only the frame that completed the truncated one is lost
        assert_eq!(rx.snapshot(), raw(&channels));
        assert_eq!(rx.stats().valid_frames, 51);
        assert_eq!(rx.stats().crc_errors, 1);
        assert_eq!(rx.stats().resyncs, 0);
    }

    #[test]
    fn test_zero_length_frame_is_dropped() {
        let rx = receiver();
        let delivery = rx.deliver(&[0xC8, 0x00]);

        assert!(!delivery.woke_consumer);
        assert_eq!(rx.stats().malformed_frames, 1);

        // Attempt already released; the next frame decodes without a resync
        rx.deliver(&encode_rc_channels_frame(&[5; CRSF_NUM_CHANNELS]));
        assert_eq!(rx.read(0), Ok(ChannelValue::Raw(5)));
    }

    #[test]
    fn test_read_invalid_channel() {
        let rx = receiver();
        assert_eq!(rx.read(16), Err(ReadError::InvalidChannel(16)));
    }

    #[test]
    fn test_empty_delivery() {
        let rx = receiver();
        let delivery = rx.deliver(&[]);
        assert_eq!(delivery.consumed, 0);
        assert_eq!(delivery.headroom, CRSF_MAX_FRAME_LEN);
    }

    #[test]
    fn test_init_registers_tick_then_rx() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_register_tick()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        transport
            .expect_bind_rx()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        transport.expect_unregister_tick().never();

        let rx = init(&mut transport, &ReceiverConfig::default()).unwrap();
        assert_eq!(rx.snapshot(), [ChannelValue::NoDriver; CRSF_NUM_CHANNELS]);
    }

    #[test]
    fn test_init_tick_refused() {
        let mut transport = MockTransport::new();
        transport
            .expect_register_tick()
            .returning(|_| Err(TransportError::NoSlot));
        transport.expect_bind_rx().never();
        transport.expect_unregister_tick().never();

        let result = init(&mut transport, &ReceiverConfig::default());
        assert_eq!(result.unwrap_err(), BindError::Tick(TransportError::NoSlot));
    }

    #[test]
    fn test_init_rx_refused_unregisters_tick() {
        let mut transport = MockTransport::new();
        transport.expect_register_tick().returning(|_| Ok(()));
        transport
            .expect_bind_rx()
            .returning(|_| Err(TransportError::AlreadyBound));
        transport.expect_unregister_tick().times(1).return_const(());

        let result = init(&mut transport, &ReceiverConfig::default());
        assert_eq!(result.unwrap_err(), BindError::Rx(TransportError::AlreadyBound));
    }

    #[test]
    fn test_handle_clones_share_state() {
        let rx = receiver();
        let consumer = rx.clone();

        rx.deliver(&encode_rc_channels_frame(&[321; CRSF_NUM_CHANNELS]));

        assert_eq!(consumer.read(15), Ok(ChannelValue::Raw(321)));
    }

    #[test]
    fn test_independent_instances() {
        let a = receiver();
        let b = receiver();

        a.deliver(&encode_rc_channels_frame(&[10; CRSF_NUM_CHANNELS]));

        assert_eq!(a.read(0), Ok(ChannelValue::Raw(10)));
        assert_eq!(b.read(0), Ok(ChannelValue::NoDriver));
    }

    #[test]
    fn test_concurrent_delivery_tick_and_reads() {
        use std::thread;

        let rx = receiver();
        let frames: Vec<_> = [300u16, 1800]
            .iter()
            .map(|&v| encode_rc_channels_frame(&[v; CRSF_NUM_CHANNELS]))
            .collect();

        let feeder = {
            let rx = rx.clone();
            thread::spawn(move || {
                for n in 0..2000 {
                    rx.deliver(&frames[n % 2]);
                }
            })
        };
        let ticker = {
            let rx = rx.clone();
            thread::spawn(move || {
                for _ in 0..2000 {
                    rx.tick();
                }
            })
        };

        for _ in 0..2000 {
            for value in rx.snapshot() {
                assert!(matches!(
                    value,
                    ChannelValue::NoDriver
                        | ChannelValue::Timeout
                        | ChannelValue::Raw(300)
                        | ChannelValue::Raw(1800)
                ));
            }
        }

        feeder.join().unwrap();
        ticker.join().unwrap();
        assert_eq!(rx.stats().crc_errors, 0);
    }
}
