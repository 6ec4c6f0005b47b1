//! Output pins that only log.
//!
//! Used when the controller runs on a host without GPIO: every level change
//! is emitted as a `tracing` event carrying the line and the configured pin.

use crate::{
    Result,
    traits::OutputPins,
    types::{DeviceInfo, OutputLine, PinConfig},
};
use tracing::info;

/// Output pins backed by `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingOutputs {
    pins: PinConfig,
    levels: [bool; 3],
}

impl LoggingOutputs {
    /// Create logging outputs for the given pin assignment.
    pub fn new(pins: PinConfig) -> Self {
        Self {
            pins,
            levels: [false; 3],
        }
    }

    /// Last level written to `line`.
    pub fn level(&self, line: OutputLine) -> bool {
        self.levels[index(line)]
    }
}

fn index(line: OutputLine) -> usize {
    match line {
        OutputLine::Led => 0,
        OutputLine::Buzzer => 1,
        OutputLine::Relay => 2,
    }
}

impl OutputPins for LoggingOutputs {
    async fn set_output(&mut self, line: OutputLine, high: bool) -> Result<()> {
        self.levels[index(line)] = high;
        info!(
            line = %line,
            pin = self.pins.output_pin(line),
            level = u8::from(high),
            "Output level changed"
        );
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Logging outputs", "tracing"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_outputs_track_levels() {
        let mut outputs = LoggingOutputs::new(PinConfig::default());
        outputs.set_output(OutputLine::Relay, true).await.unwrap();
        assert!(outputs.level(OutputLine::Relay));
        outputs.reset().await.unwrap();
        assert!(!outputs.level(OutputLine::Relay));
    }
}
