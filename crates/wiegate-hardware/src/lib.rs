//! GPIO boundary of the Wiegand gate controller.
//!
//! This crate owns everything that touches pins: the falling-edge handlers on
//! the D0/D1 data lines, the lock-free pulse channel that carries their bits
//! out of interrupt context, and the output lines (LED, buzzer, relay) the
//! actuation controller drives.
//!
//! # Inputs
//!
//! [`WiegandInput`] is owned by the edge handler. Each falling edge becomes a
//! [`BitEvent`] pushed onto a bounded SPSC ring without blocking; the frame
//! worker awaits them through a [`PulseConsumer`]:
//!
//! ```
//! use wiegate_hardware::{DataLine, PinConfig, WiegandInput};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (input, mut pulses) = WiegandInput::new(PinConfig::default(), 128);
//! input.on_edge(DataLine::D1);
//! drop(input);
//!
//! while let Some(event) = pulses.recv().await {
//!     println!("bit {} at {:?}", event.bit, event.at);
//! }
//! # }
//! ```
//!
//! # Outputs
//!
//! The [`OutputPins`] trait drives a line high or low:
//!
//! ```no_run
//! use wiegate_hardware::{OutputLine, OutputPins, Result};
//!
//! async fn open_relay<P: OutputPins>(pins: &mut P) -> Result<()> {
//!     pins.set_output(OutputLine::Relay, true).await
//! }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`][error::Result] carrying a
//! [`HardwareError`].
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides a recording [`MockOutputs`](mock::MockOutputs)
//! and a [`MockWiegandReader`](mock::MockWiegandReader) that replays bit
//! sequences with realistic spacing.

pub mod devices;
pub mod error;
pub mod input;
pub mod logging;
pub mod mock;
pub mod pulse;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyOutputPins;
pub use error::{HardwareError, Result};
pub use input::WiegandInput;
pub use logging::LoggingOutputs;
pub use pulse::{BitEvent, PulseConsumer, PulseProducer, pulse_channel};
pub use traits::OutputPins;
pub use types::{DataLine, DeviceInfo, OutputLine, PinConfig};
