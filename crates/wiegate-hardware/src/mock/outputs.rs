//! Mock gate outputs for testing and development.
//!
//! [`MockOutputs`] records every level change and forwards it to a
//! [`MockOutputsHandle`], so tests can assert the exact sequence and timing of
//! LED, buzzer and relay activity.

use crate::{
    HardwareError, Result,
    traits::OutputPins,
    types::{DeviceInfo, OutputLine},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// A single recorded output transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    /// Line that changed.
    pub line: OutputLine,

    /// New level.
    pub high: bool,

    /// Time of the change.
    pub at: Instant,
}

fn line_mask(line: OutputLine) -> u8 {
    match line {
        OutputLine::Led => 0b001,
        OutputLine::Buzzer => 0b010,
        OutputLine::Relay => 0b100,
    }
}

/// Mock output pins.
///
/// # Examples
///
/// ```
/// use wiegate_hardware::mock::MockOutputs;
/// use wiegate_hardware::traits::OutputPins;
/// use wiegate_hardware::types::OutputLine;
///
/// #[tokio::main]
/// async fn main() -> wiegate_hardware::Result<()> {
///     let (mut outputs, mut handle) = MockOutputs::new();
///
///     outputs.set_output(OutputLine::Relay, true).await?;
///     assert!(outputs.level(OutputLine::Relay));
///
///     let change = handle.next_change().await.unwrap();
///     assert_eq!(change.line, OutputLine::Relay);
///     assert!(change.high);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockOutputs {
    /// Current level bitmask (LED, buzzer, relay)
    levels: u8,

    /// Lines whose writes are forced to fail
    failing: Arc<AtomicU8>,

    /// Channel sender for recorded changes
    change_tx: mpsc::UnboundedSender<LevelChange>,

    /// Device name
    name: String,
}

impl MockOutputs {
    /// Create mock outputs with the default name.
    pub fn new() -> (Self, MockOutputsHandle) {
        Self::with_name("Mock Gate Outputs".to_string())
    }

    /// Create mock outputs with a custom name.
    pub fn with_name(name: String) -> (Self, MockOutputsHandle) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let failing = Arc::new(AtomicU8::new(0));

        let outputs = Self {
            levels: 0,
            failing: Arc::clone(&failing),
            change_tx,
            name,
        };

        let handle = MockOutputsHandle { change_rx, failing };

        (outputs, handle)
    }

    /// Current level of `line`.
    pub fn level(&self, line: OutputLine) -> bool {
        self.levels & line_mask(line) != 0
    }
}

impl Default for MockOutputs {
    fn default() -> Self {
        Self::new().0
    }
}

impl OutputPins for MockOutputs {
    async fn set_output(&mut self, line: OutputLine, high: bool) -> Result<()> {
        if self.failing.load(Ordering::Relaxed) & line_mask(line) != 0 {
            return Err(HardwareError::output_failed(line, "simulated failure"));
        }

        if high {
            self.levels |= line_mask(line);
        } else {
            self.levels &= !line_mask(line);
        }

        // A dropped handle just means nobody is recording
        let _ = self.change_tx.send(LevelChange {
            line,
            high,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock"))
    }
}

/// Handle observing a [`MockOutputs`].
#[derive(Debug)]
pub struct MockOutputsHandle {
    change_rx: mpsc::UnboundedReceiver<LevelChange>,
    failing: Arc<AtomicU8>,
}

impl MockOutputsHandle {
    /// Wait for the next recorded change.
    ///
    /// Returns `None` once the outputs have been dropped and every change
    /// has been observed.
    pub async fn next_change(&mut self) -> Option<LevelChange> {
        self.change_rx.recv().await
    }

    /// Take every change recorded so far without waiting.
    pub fn drain(&mut self) -> Vec<LevelChange> {
        std::iter::from_fn(|| self.change_rx.try_recv().ok()).collect()
    }

    /// Make writes to `line` fail (or succeed again).
    pub fn set_failing(&self, line: OutputLine, failing: bool) {
        if failing {
            self.failing.fetch_or(line_mask(line), Ordering::Relaxed);
        } else {
            self.failing.fetch_and(!line_mask(line), Ordering::Relaxed);
        }
    }
}
