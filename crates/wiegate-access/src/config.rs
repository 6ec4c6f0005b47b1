//! Gate configuration.

use crate::access::AccessConfig;
use crate::actuation::ActuationConfig;
use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};
use wiegate_hardware::PinConfig;
use wiegate_wiegand::ReaderConfig;

/// Everything the gate pipeline needs besides its store.
///
/// Every section defaults, so an empty JSON object is a valid
/// configuration.
///
/// # Examples
///
/// ```
/// use wiegate_access::{AuditPolicy, GateConfig};
///
/// let config: GateConfig =
///     serde_json::from_str(r#"{"access": {"audit_policy": "all_reads"}}"#).unwrap();
/// assert_eq!(config.access.audit_policy, AuditPolicy::AllReads);
/// assert_eq!(config.reader.gap_ms, 40);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub pins: PinConfig,
    pub reader: ReaderConfig,
    pub actuation: ActuationConfig,
    pub access: AccessConfig,
}

impl GateConfig {
    pub fn with_pins(mut self, pins: PinConfig) -> Self {
        self.pins = pins;
        self
    }

    pub fn with_reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_actuation(mut self, actuation: ActuationConfig) -> Self {
        self.actuation = actuation;
        self
    }

    pub fn with_access(mut self, access: AccessConfig) -> Self {
        self.access = access;
        self
    }

    /// Check the pin assignment and reader timing.
    ///
    /// # Errors
    ///
    /// Returns a hardware configuration error if two lines share a pin, and
    /// [`AccessError::InvalidConfig`] if the frame gap is zero.
    pub fn validate(&self) -> Result<()> {
        self.pins.validate()?;
        if self.reader.gap_ms == 0 {
            return Err(AccessError::InvalidConfig(
                "reader.gap_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
