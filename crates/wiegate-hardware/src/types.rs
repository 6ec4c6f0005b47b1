//! Common types shared across the GPIO boundary.
//!
//! This module defines the input and output lines of a Wiegand gate
//! controller, the pin assignment used to wire them, and generic device
//! metadata.

use crate::error::{HardwareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use wiegate_core::Bit;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Gate outputs", "Mock Wiegand Reader").
    pub name: String,

    /// Device model identifier.
    pub model: String,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Wiegand data input line.
///
/// Readers pull D0 low to signal a zero bit and D1 low to signal a one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLine {
    /// Data-0 line.
    D0,

    /// Data-1 line.
    D1,
}

impl DataLine {
    /// Bit signalled by a pulse on this line.
    #[inline]
    #[must_use]
    pub fn bit(self) -> Bit {
        match self {
            Self::D0 => Bit::Zero,
            Self::D1 => Bit::One,
        }
    }
}

impl fmt::Display for DataLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D0 => write!(f, "D0"),
            Self::D1 => write!(f, "D1"),
        }
    }
}

/// Gate controller output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLine {
    /// Indication LED.
    Led,

    /// Indication buzzer.
    Buzzer,

    /// Gate relay.
    Relay,
}

impl OutputLine {
    /// All output lines, in initialization order.
    pub const ALL: [OutputLine; 3] = [OutputLine::Led, OutputLine::Buzzer, OutputLine::Relay];
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Led => write!(f, "LED"),
            Self::Buzzer => write!(f, "buzzer"),
            Self::Relay => write!(f, "relay"),
        }
    }
}

/// GPIO pin assignment for the reader inputs and gate outputs.
///
/// # Examples
///
/// ```
/// use wiegate_hardware::types::PinConfig;
///
/// let pins = PinConfig::default().with_relay(12);
/// assert_eq!(pins.d0, 4);
/// assert_eq!(pins.relay, 12);
/// assert!(pins.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// Data-0 input (falling edge = bit 0).
    pub d0: u8,

    /// Data-1 input (falling edge = bit 1).
    pub d1: u8,

    /// Indication LED output.
    pub led: u8,

    /// Buzzer output.
    pub buzzer: u8,

    /// Relay output.
    pub relay: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            d0: 4,
            d1: 5,
            led: 6,
            buzzer: 7,
            relay: 10,
        }
    }
}

impl PinConfig {
    /// Set the relay output pin.
    pub fn with_relay(mut self, pin: u8) -> Self {
        self.relay = pin;
        self
    }

    /// Set the LED output pin.
    pub fn with_led(mut self, pin: u8) -> Self {
        self.led = pin;
        self
    }

    /// Set the buzzer output pin.
    pub fn with_buzzer(mut self, pin: u8) -> Self {
        self.buzzer = pin;
        self
    }

    /// Set the data input pins.
    pub fn with_data_pins(mut self, d0: u8, d1: u8) -> Self {
        self.d0 = d0;
        self.d1 = d1;
        self
    }

    /// Pin driving the given output line.
    #[must_use]
    pub fn output_pin(&self, line: OutputLine) -> u8 {
        match line {
            OutputLine::Led => self.led,
            OutputLine::Buzzer => self.buzzer,
            OutputLine::Relay => self.relay,
        }
    }

    /// Check that no pin is assigned twice.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first shared pin.
    pub fn validate(&self) -> Result<()> {
        let pins = [
            ("d0", self.d0),
            ("d1", self.d1),
            ("led", self.led),
            ("buzzer", self.buzzer),
            ("relay", self.relay),
        ];
        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(HardwareError::configuration(format!(
                    "{name} and {other} share pin {pin}"
                )));
            }
        }
        Ok(())
    }
}
