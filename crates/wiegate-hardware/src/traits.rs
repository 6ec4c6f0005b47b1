//! Hardware device trait definitions.
//!
//! The gate controller drives three digital outputs (indication LED, buzzer and
//! relay). [`OutputPins`] is the contract between the actuation logic and the
//! board, so the same controller runs against real GPIO, a logging stand-in or
//! a recording mock.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, OutputLine};

/// Digital output lines of the gate controller.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic parameters, or the enum wrapper
/// [`AnyOutputPins`](crate::devices::AnyOutputPins) when the implementation
/// is chosen at runtime.
///
/// ```no_run
/// use wiegate_hardware::traits::OutputPins;
/// use wiegate_hardware::types::OutputLine;
/// use wiegate_hardware::error::Result;
///
/// async fn all_off<P: OutputPins>(pins: &mut P) -> Result<()> {
///     for line in OutputLine::ALL {
///         pins.set_output(line, false).await?;
///     }
///     Ok(())
/// }
/// ```
pub trait OutputPins: Send + Sync {
    /// Drive an output line high (`true`) or low (`false`).
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::OutputFailed`](crate::HardwareError::OutputFailed)
    /// if the line cannot be driven.
    async fn set_output(&mut self, line: OutputLine, high: bool) -> Result<()>;

    /// Drive every line low.
    ///
    /// Called once at startup so the relay is de-energized before the first
    /// frame is processed.
    async fn reset(&mut self) -> Result<()> {
        for line in OutputLine::ALL {
            self.set_output(line, false).await?;
        }
        Ok(())
    }

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
