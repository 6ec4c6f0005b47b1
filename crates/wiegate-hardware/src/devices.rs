//! Enum wrapper for output device dispatch.
//!
//! Native `async fn` in traits (RPITIT) is not object-safe, so
//! `Box<dyn OutputPins>` is not available. [`AnyOutputPins`] provides concrete
//! dispatch instead, letting the actuation controller pick an implementation
//! at runtime.
//!
//! # Examples
//!
//! ```
//! use wiegate_hardware::devices::AnyOutputPins;
//! use wiegate_hardware::mock::MockOutputs;
//!
//! let (outputs, _handle) = MockOutputs::new();
//! let any_outputs = AnyOutputPins::Mock(outputs);
//! ```

use crate::logging::LoggingOutputs;
use crate::mock::MockOutputs;
use crate::traits::OutputPins;
use crate::{DeviceInfo, OutputLine, Result};

/// Enum wrapper for output pin dispatch.
///
/// # Examples
///
/// ```
/// use wiegate_hardware::devices::AnyOutputPins;
/// use wiegate_hardware::traits::OutputPins;
/// use wiegate_hardware::types::{OutputLine, PinConfig};
///
/// #[tokio::main]
/// async fn main() -> wiegate_hardware::Result<()> {
///     let mut outputs = AnyOutputPins::logging(PinConfig::default());
///     outputs.set_output(OutputLine::Led, true).await?;
///
///     let info = outputs.get_info().await?;
///     println!("Outputs: {}", info.name);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputPins {
    /// Recording mock for tests.
    Mock(MockOutputs),

    /// Host stand-in that logs every change.
    Logging(LoggingOutputs),
}

impl AnyOutputPins {
    /// Logging outputs for the given pin assignment.
    pub fn logging(pins: crate::PinConfig) -> Self {
        Self::Logging(LoggingOutputs::new(pins))
    }
}

impl From<MockOutputs> for AnyOutputPins {
    fn from(outputs: MockOutputs) -> Self {
        Self::Mock(outputs)
    }
}

impl From<LoggingOutputs> for AnyOutputPins {
    fn from(outputs: LoggingOutputs) -> Self {
        Self::Logging(outputs)
    }
}

impl OutputPins for AnyOutputPins {
    async fn set_output(&mut self, line: OutputLine, high: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_output(line, high).await,
            Self::Logging(device) => device.set_output(line, high).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Logging(device) => device.get_info().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_output_pins_dispatches_to_mock() {
        let (outputs, mut handle) = MockOutputs::new();
        let mut any = AnyOutputPins::from(outputs);

        any.set_output(OutputLine::Buzzer, true).await.unwrap();

        let change = handle.next_change().await.unwrap();
        assert_eq!(change.line, OutputLine::Buzzer);
        assert!(change.high);
        assert_eq!(any.get_info().await.unwrap().model, "Mock");
    }

    #[tokio::test]
    async fn test_any_output_pins_dispatches_to_logging() {
        let mut any = AnyOutputPins::logging(crate::PinConfig::default());
        any.reset().await.unwrap();
        assert_eq!(any.get_info().await.unwrap().model, "tracing");
    }
}
