//! Reader configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiegate_core::constants::{
    DEFAULT_FRAME_GAP_MS, DEFAULT_FRAME_QUEUE_CAPACITY, DEFAULT_PULSE_CHANNEL_CAPACITY,
};

/// Configuration for the Wiegand reader worker.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wiegate_wiegand::ReaderConfig;
///
/// let config = ReaderConfig::default().with_gap_ms(30);
/// assert_eq!(config.gap(), Duration::from_millis(30));
/// assert_eq!(config.pulse_capacity, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Silence after the last edge that closes a frame, in milliseconds.
    pub gap_ms: u64,

    /// Capacity of the edge-to-worker pulse channel.
    pub pulse_capacity: usize,

    /// Capacity of the frame channel to the access worker.
    pub frame_queue_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            gap_ms: DEFAULT_FRAME_GAP_MS,
            pulse_capacity: DEFAULT_PULSE_CHANNEL_CAPACITY,
            frame_queue_capacity: DEFAULT_FRAME_QUEUE_CAPACITY,
        }
    }
}

impl ReaderConfig {
    /// Set the inter-frame gap.
    pub fn with_gap_ms(mut self, gap_ms: u64) -> Self {
        self.gap_ms = gap_ms;
        self
    }

    /// Set the pulse channel capacity.
    pub fn with_pulse_capacity(mut self, capacity: usize) -> Self {
        self.pulse_capacity = capacity;
        self
    }

    /// Set the frame channel capacity.
    pub fn with_frame_queue_capacity(mut self, capacity: usize) -> Self {
        self.frame_queue_capacity = capacity;
        self
    }

    /// Inter-frame gap as a [`Duration`].
    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }
}
