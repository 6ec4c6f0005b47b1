//! Wiegand frame assembly.
//!
//! Wiegand has no start or stop marker. The assembler accumulates bits and
//! closes the frame once the line has been silent for the configured gap.
//!
//! # States
//!
//! - `Idle`: no bits pending, no deadline armed
//! - `Accumulating`: at least one bit pending, deadline = last edge + gap
//!
//! # Transitions
//!
//! - Idle + bit → Accumulating (deadline armed)
//! - Accumulating + bit → Accumulating (deadline re-armed; the bit is dropped
//!   once the frame holds [`MAX_FRAME_BITS`])
//! - Accumulating + deadline reached → emit UID → Idle
//! - Accumulating + bit captured at or after the deadline → emit UID, the
//!   bit starts the next frame
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use wiegate_core::Bit;
//! use wiegate_hardware::BitEvent;
//! use wiegate_wiegand::FrameAssembler;
//!
//! let mut assembler = FrameAssembler::new(Duration::from_millis(40));
//! let start = Instant::now();
//!
//! for (i, bit) in [Bit::One, Bit::Zero, Bit::One, Bit::One].into_iter().enumerate() {
//!     let at = start + Duration::from_millis(2 * i as u64);
//!     assert!(assembler.push(BitEvent::new(bit, at)).is_none());
//! }
//!
//! let deadline = assembler.deadline().unwrap();
//! let uid = assembler.expire(deadline).unwrap();
//! assert_eq!(uid.to_hex(), "B0");
//! assert!(assembler.is_idle());
//! ```

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};
use wiegate_core::Uid;
use wiegate_core::constants::MAX_FRAME_BITS;
use wiegate_hardware::BitEvent;

/// Observable assembler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No bits pending.
    Idle,

    /// Bits pending, waiting for the line to go quiet.
    Accumulating {
        /// Bits accumulated so far (capped at [`MAX_FRAME_BITS`]).
        bits: usize,

        /// Instant at which the frame closes if no further edge arrives.
        deadline: Instant,
    },
}

/// Accumulates bit events into frames and packs completed frames into UIDs.
///
/// The frame is held right-aligned in a `u64`, first bit in the most
/// significant occupied position.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    value: u64,
    len: usize,
    last_edge: Option<Instant>,
    gap: Duration,
    overflow_bits: u64,
}

impl FrameAssembler {
    /// Create an idle assembler closing frames after `gap` of silence.
    pub fn new(gap: Duration) -> Self {
        Self {
            value: 0,
            len: 0,
            last_edge: None,
            gap,
            overflow_bits: 0,
        }
    }

    /// Configured inter-frame gap.
    pub fn gap(&self) -> Duration {
        self.gap
    }

    /// Feed one bit event.
    ///
    /// Returns the previous frame's UID if this event was captured at or after
    /// that frame's deadline; the event itself then opens a new frame.
    pub fn push(&mut self, event: BitEvent) -> Option<Uid> {
        let completed = match self.deadline() {
            Some(deadline) if event.at >= deadline => self.finish(),
            _ => None,
        };

        if self.len < MAX_FRAME_BITS {
            self.value = (self.value << 1) | u64::from(event.bit.to_u8());
            self.len += 1;
        } else {
            self.overflow_bits += 1;
            trace!(bit = %event.bit, "Frame full, dropping bit");
        }

        // Dropped bits still restart the idle timer
        self.last_edge = Some(event.at);
        completed
    }

    /// Instant at which the pending frame closes, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_edge.map(|last| last + self.gap)
    }

    /// Close the pending frame if `now` has reached its deadline.
    pub fn expire(&mut self, now: Instant) -> Option<Uid> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.finish(),
            _ => None,
        }
    }

    /// Close the pending frame unconditionally.
    ///
    /// Used when the pulse stream ends with bits still pending.
    pub fn flush(&mut self) -> Option<Uid> {
        self.finish()
    }

    /// Current state.
    pub fn state(&self) -> AssemblerState {
        match self.deadline() {
            Some(deadline) => AssemblerState::Accumulating {
                bits: self.len,
                deadline,
            },
            None => AssemblerState::Idle,
        }
    }

    /// Returns `true` if no bits are pending.
    pub fn is_idle(&self) -> bool {
        self.last_edge.is_none()
    }

    /// Total bits dropped because a frame was already full.
    pub fn overflow_bits(&self) -> u64 {
        self.overflow_bits
    }

    fn finish(&mut self) -> Option<Uid> {
        let (value, len) = (self.value, self.len);
        self.value = 0;
        self.len = 0;
        self.last_edge = None;

        // len is capped at MAX_FRAME_BITS, so only an empty frame fails here
        let uid = Uid::from_frame(value, len).ok()?;
        debug!(uid = %uid, bits = len, "Frame completed");
        Some(uid)
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            wiegate_core::constants::DEFAULT_FRAME_GAP_MS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiegate_core::Bit;

    const GAP: Duration = Duration::from_millis(40);
    const BIT: Duration = Duration::from_millis(2);

    /// Feed `bits` starting at `start`, one every `BIT`. Returns the last
    /// edge time and any frame emitted on the way.
    fn feed(assembler: &mut FrameAssembler, bits: &str, start: Instant) -> (Instant, Vec<Uid>) {
        let mut emitted = Vec::new();
        let mut at = start;
        for (i, bit) in Bit::parse_sequence(bits).unwrap().into_iter().enumerate() {
            at = start + BIT * i as u32;
            emitted.extend(assembler.push(BitEvent::new(bit, at)));
        }
        (at, emitted)
    }

    #[test]
    fn test_new_assembler_is_idle() {
        let assembler = FrameAssembler::new(GAP);
        assert_eq!(assembler.state(), AssemblerState::Idle);
        assert!(assembler.deadline().is_none());
        assert_eq!(assembler.gap(), GAP);
    }

    #[test]
    fn test_zero_bits_never_emit() {
        let mut assembler = FrameAssembler::new(GAP);
        let now = Instant::now();
        assert!(assembler.expire(now + GAP * 10).is_none());
        assert!(assembler.flush().is_none());
    }

    #[rstest]
    #[case::four_bits("1011", "B0")]
    #[case::one_byte("10110100", "B4")]
    #[case::single_one("1", "80")]
    #[case::single_zero("0", "00")]
    #[case::nine_bits("111111111", "FF80")]
    #[case::wiegand_26("10000000100000000000000011", "808000C0")]
    fn test_frame_packing(#[case] bits: &str, #[case] hex: &str) {
        let mut assembler = FrameAssembler::new(GAP);
        let (last, emitted) = feed(&mut assembler, bits, Instant::now());
        assert!(emitted.is_empty());

        let uid = assembler.expire(last + GAP).unwrap();
        assert_eq!(uid.to_hex(), hex);
        assert!(assembler.is_idle());
    }

    #[test]
    fn test_deadline_rearms_on_every_bit() {
        let mut assembler = FrameAssembler::new(GAP);
        let start = Instant::now();

        assembler.push(BitEvent::new(Bit::One, start));
        assert_eq!(assembler.deadline(), Some(start + GAP));

        // 39 ms later: still the same frame
        let second = start + Duration::from_millis(39);
        assert!(assembler.push(BitEvent::new(Bit::Zero, second)).is_none());
        assert_eq!(assembler.deadline(), Some(second + GAP));

        // Old deadline has passed but the timer was re-armed
        assert!(assembler.expire(start + GAP).is_none());
        assert_eq!(
            assembler.state(),
            AssemblerState::Accumulating {
                bits: 2,
                deadline: second + GAP
            }
        );

        let uid = assembler.expire(second + GAP).unwrap();
        assert_eq!(uid.as_bytes(), &[0x80]);
        assert_eq!(uid.bit_count(), 2);
    }

    #[test]
    fn test_late_bit_splits_frames() {
        let mut assembler = FrameAssembler::new(GAP);
        let start = Instant::now();

        let (last, _) = feed(&mut assembler, "1011", start);

        // Worker was late: the next bit was captured after the deadline
        let late = last + GAP + Duration::from_millis(5);
        let first = assembler.push(BitEvent::new(Bit::One, late)).unwrap();
        assert_eq!(first.to_hex(), "B0");

        let second = assembler.expire(late + GAP).unwrap();
        assert_eq!(second.to_hex(), "80");
        assert_eq!(second.bit_count(), 1);
    }

    #[test]
    fn test_bit_exactly_at_deadline_splits() {
        let mut assembler = FrameAssembler::new(GAP);
        let start = Instant::now();
        assembler.push(BitEvent::new(Bit::One, start));

        let emitted = assembler.push(BitEvent::new(Bit::One, start + GAP));
        assert!(emitted.is_some());
    }

    #[test]
    fn test_bits_beyond_capacity_are_dropped_but_rearm() {
        let mut assembler = FrameAssembler::new(GAP);
        let start = Instant::now();

        let bits = "1".repeat(MAX_FRAME_BITS + 6);
        let (last, emitted) = feed(&mut assembler, &bits, start);
        assert!(emitted.is_empty());
        assert_eq!(assembler.overflow_bits(), 6);
        assert_eq!(assembler.deadline(), Some(last + GAP));

        let uid = assembler.expire(last + GAP).unwrap();
        assert_eq!(uid.bit_count(), MAX_FRAME_BITS);
        assert_eq!(uid.as_bytes(), &[0xFF; 8]);
    }

    #[test]
    fn test_state_resets_between_frames() {
        let mut assembler = FrameAssembler::new(GAP);
        let start = Instant::now();

        let (last, _) = feed(&mut assembler, "11111111", start);
        assert_eq!(assembler.expire(last + GAP).unwrap().to_hex(), "FF");

        let (last, _) = feed(&mut assembler, "0000", last + GAP * 2);
        assert_eq!(assembler.expire(last + GAP).unwrap().to_hex(), "00");
    }

    #[test]
    fn test_flush_emits_pending_frame() {
        let mut assembler = FrameAssembler::new(GAP);
        feed(&mut assembler, "10110100", Instant::now());

        assert_eq!(assembler.flush().unwrap().to_hex(), "B4");
        assert!(assembler.flush().is_none());
    }
}
