//! Mock Wiegand card reader.
//!
//! Drives a [`WiegandInput`] the way a physical reader drives D0/D1: one
//! falling edge per bit, a short fixed interval between bits, then silence.

use crate::input::WiegandInput;
use crate::pulse::PulseConsumer;
use crate::types::{DataLine, DeviceInfo, PinConfig};
use crate::{HardwareError, Result};
use std::time::Duration;
use tokio::time::Instant;
use wiegate_core::Bit;

/// Typical spacing between Wiegand bits on the wire.
pub const DEFAULT_BIT_INTERVAL: Duration = Duration::from_millis(2);

/// Mock Wiegand reader.
///
/// # Examples
///
/// ```
/// use wiegate_core::Bit;
/// use wiegate_hardware::mock::MockWiegandReader;
///
/// #[tokio::main]
/// async fn main() -> wiegate_hardware::Result<()> {
///     let (reader, mut pulses) = MockWiegandReader::new(64);
///
///     reader.present_str("1011").await?;
///
///     assert_eq!(pulses.len(), 4);
///     assert_eq!(pulses.try_pop().map(|e| e.bit), Some(Bit::One));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockWiegandReader {
    input: WiegandInput,
    interval: Duration,
    name: String,
}

impl MockWiegandReader {
    /// Create a mock reader and the consumer half of its pulse channel.
    pub fn new(capacity: usize) -> (Self, PulseConsumer) {
        let (input, consumer) = WiegandInput::new(PinConfig::default(), capacity);
        (
            Self {
                input,
                interval: DEFAULT_BIT_INTERVAL,
                name: "Mock Wiegand Reader".to_string(),
            },
            consumer,
        )
    }

    /// Set the spacing between bits.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Present a card: emit one edge per bit, sleeping the bit interval
    /// between edges.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidData`] if an edge was dropped because
    /// the pulse channel was full.
    pub async fn present_bits(&self, bits: &[Bit]) -> Result<()> {
        for (i, bit) in bits.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.interval).await;
            }
            if !self.input.on_edge(line_for(*bit)) {
                return Err(HardwareError::invalid_data(format!(
                    "pulse channel full after {i} of {} bits",
                    bits.len()
                )));
            }
        }
        Ok(())
    }

    /// Present a card given as a textual bit sequence (`"1011 0100"`).
    ///
    /// # Errors
    ///
    /// Returns a core error for characters other than `0` and `1`, and the
    /// same errors as [`present_bits`](Self::present_bits).
    pub async fn present_str(&self, bits: &str) -> Result<()> {
        let bits = Bit::parse_sequence(bits)?;
        self.present_bits(&bits).await
    }

    /// Emit `bits` with explicit timestamps starting at `start`, without
    /// sleeping.
    ///
    /// Returns the timestamp of the last edge. Dropped edges are not
    /// reported here; check [`dropped`](Self::dropped).
    pub fn present_bits_at(&self, bits: &[Bit], start: Instant) -> Instant {
        let mut at = start;
        for (i, bit) in bits.iter().enumerate() {
            at = start + self.interval * i as u32;
            self.input.on_edge_at(line_for(*bit), at);
        }
        at
    }

    /// Number of edges dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.input.dropped()
    }

    /// Device description.
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock")
    }
}

fn line_for(bit: Bit) -> DataLine {
    match bit {
        Bit::Zero => DataLine::D0,
        Bit::One => DataLine::D1,
    }
}
