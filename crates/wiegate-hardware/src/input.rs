//! Edge dispatch for the Wiegand data lines.
//!
//! Both D0 and D1 are configured as pulled-up inputs that interrupt on the
//! falling edge. [`WiegandInput`] is what the edge handler owns: it maps the
//! line that fired to a bit and publishes it on the pulse channel without
//! blocking.

use crate::pulse::{PulseConsumer, PulseProducer, pulse_channel};
use crate::types::{DataLine, PinConfig};
use tokio::time::Instant;

/// Edge-context half of the Wiegand reader.
///
/// # Examples
///
/// ```
/// use wiegate_core::Bit;
/// use wiegate_hardware::input::WiegandInput;
/// use wiegate_hardware::types::{DataLine, PinConfig};
///
/// let (input, mut pulses) = WiegandInput::new(PinConfig::default(), 16);
/// input.on_edge(DataLine::D1);
/// input.on_edge(DataLine::D0);
///
/// assert_eq!(pulses.try_pop().map(|e| e.bit), Some(Bit::One));
/// assert_eq!(pulses.try_pop().map(|e| e.bit), Some(Bit::Zero));
/// ```
#[derive(Debug)]
pub struct WiegandInput {
    producer: PulseProducer,
    pins: PinConfig,
}

impl WiegandInput {
    /// Create the input and the consumer half of its pulse channel.
    pub fn new(pins: PinConfig, capacity: usize) -> (Self, PulseConsumer) {
        let (producer, consumer) = pulse_channel(capacity);
        (Self { producer, pins }, consumer)
    }

    /// Handle a falling edge on `line`, stamped with the current time.
    ///
    /// Returns `false` if the event was dropped because the channel was full.
    #[inline]
    pub fn on_edge(&self, line: DataLine) -> bool {
        self.producer.push(line.bit())
    }

    /// Handle a falling edge on `line` captured at `at`.
    #[inline]
    pub fn on_edge_at(&self, line: DataLine, at: Instant) -> bool {
        self.producer.push_at(line.bit(), at)
    }

    /// Handle a falling edge reported by GPIO number.
    ///
    /// Edges on pins other than D0 and D1 are ignored and return `false`.
    pub fn on_pin_edge(&self, pin: u8) -> bool {
        match self.line_for_pin(pin) {
            Some(line) => self.on_edge(line),
            None => false,
        }
    }

    /// Data line wired to `pin`, if any.
    pub fn line_for_pin(&self, pin: u8) -> Option<DataLine> {
        if pin == self.pins.d0 {
            Some(DataLine::D0)
        } else if pin == self.pins.d1 {
            Some(DataLine::D1)
        } else {
            None
        }
    }

    /// Number of edges discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.producer.dropped()
    }

    /// Pin assignment in use.
    pub fn pins(&self) -> &PinConfig {
        &self.pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiegate_core::Bit;

    #[tokio::test(start_paused = true)]
    async fn test_pin_edges_map_to_lines() {
        let pins = PinConfig::default().with_data_pins(12, 13);
        let (input, mut pulses) = WiegandInput::new(pins, 8);

        assert!(input.on_pin_edge(13));
        assert!(input.on_pin_edge(12));
        assert!(!input.on_pin_edge(99));

        assert_eq!(pulses.try_pop().map(|e| e.bit), Some(Bit::One));
        assert_eq!(pulses.try_pop().map(|e| e.bit), Some(Bit::Zero));
        assert!(pulses.try_pop().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_is_counted() {
        let (input, _pulses) = WiegandInput::new(PinConfig::default(), 2);

        assert!(input.on_edge(DataLine::D0));
        assert!(input.on_edge(DataLine::D0));
        assert!(!input.on_edge(DataLine::D1));
        assert_eq!(input.dropped(), 1);
    }
}
