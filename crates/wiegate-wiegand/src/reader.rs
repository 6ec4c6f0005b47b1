//! Reader worker: drains the pulse channel and emits completed frames.
//!
//! The worker waits on two things at once: the next bit event and the
//! assembler's deadline. Pending events are always drained before the
//! deadline is honoured, so a frame is never cut short because the worker
//! was scheduled late.

use crate::assembler::FrameAssembler;
use crate::config::ReaderConfig;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wiegate_core::Uid;
use wiegate_hardware::PulseConsumer;

/// Counters reported when the reader stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames handed to the access worker.
    pub frames: u64,

    /// Frames discarded because the frame channel was full.
    pub frames_dropped: u64,

    /// Edges discarded because the pulse channel was full.
    pub edges_dropped: u64,

    /// Bits discarded because a frame already held the maximum bit count.
    pub bits_dropped: u64,
}

/// Wiegand reader worker.
///
/// # Examples
///
/// ```
/// use tokio::sync::mpsc;
/// use wiegate_hardware::mock::MockWiegandReader;
/// use wiegate_wiegand::{ReaderConfig, WiegandReader};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let (mock, pulses) = MockWiegandReader::new(128);
///     let (frames_tx, mut frames_rx) = mpsc::channel(4);
///     let reader = WiegandReader::new(pulses, &ReaderConfig::default(), frames_tx);
///     let task = tokio::spawn(reader.run());
///
///     mock.present_str("10110100").await.unwrap();
///     assert_eq!(frames_rx.recv().await.unwrap().to_hex(), "B4");
///
///     drop(mock);
///     task.await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct WiegandReader {
    pulses: PulseConsumer,
    assembler: FrameAssembler,
    frames: mpsc::Sender<Uid>,
    stats: ReaderStats,
}

impl WiegandReader {
    /// Create a reader draining `pulses` and sending UIDs on `frames`.
    pub fn new(pulses: PulseConsumer, config: &ReaderConfig, frames: mpsc::Sender<Uid>) -> Self {
        Self {
            pulses,
            assembler: FrameAssembler::new(config.gap()),
            frames,
            stats: ReaderStats::default(),
        }
    }

    /// Run until the pulse producer is dropped or the frame receiver closes.
    ///
    /// A frame still pending when the pulse stream ends is flushed.
    pub async fn run(mut self) -> ReaderStats {
        info!(gap_ms = self.assembler.gap().as_millis() as u64, "Wiegand reader started");

        loop {
            let deadline = self.assembler.deadline();

            tokio::select! {
                biased;

                event = self.pulses.recv() => match event {
                    Some(event) => {
                        if let Some(uid) = self.assembler.push(event)
                            && !self.emit(uid)
                        {
                            break;
                        }
                    }
                    None => {
                        if let Some(uid) = self.assembler.flush() {
                            self.emit(uid);
                        }
                        debug!("Pulse channel closed");
                        break;
                    }
                },

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    if let Some(uid) = self.assembler.expire(Instant::now())
                        && !self.emit(uid)
                    {
                        break;
                    }
                }
            }
        }

        self.refresh_counters();
        info!(
            frames = self.stats.frames,
            frames_dropped = self.stats.frames_dropped,
            edges_dropped = self.stats.edges_dropped,
            bits_dropped = self.stats.bits_dropped,
            "Wiegand reader stopped"
        );
        self.stats
    }

    /// Hand a UID to the access worker without waiting.
    ///
    /// Returns `false` once the receiver is gone.
    fn emit(&mut self, uid: Uid) -> bool {
        self.refresh_counters();

        match self.frames.try_send(uid) {
            Ok(()) => {
                self.stats.frames += 1;
                true
            }
            Err(TrySendError::Full(uid)) => {
                self.stats.frames_dropped += 1;
                warn!(uid = %uid, "Frame channel full, dropping frame");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Frame channel closed");
                false
            }
        }
    }

    fn refresh_counters(&mut self) {
        let edges_dropped = self.pulses.dropped();
        if edges_dropped > self.stats.edges_dropped {
            warn!(
                dropped = edges_dropped - self.stats.edges_dropped,
                "Pulse channel overflowed, edges lost"
            );
            self.stats.edges_dropped = edges_dropped;
        }
        self.stats.bits_dropped = self.assembler.overflow_bits();
    }
}
