//! Application configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wiegate_access::GateConfig;
use wiegate_storage::DatabaseConfig;

/// Contents of the JSON configuration file. Every field is optional.
///
/// ```json
/// {
///   "log_level": "debug",
///   "database": { "database_path": "/var/lib/wiegate/wiegate.db" },
///   "gate": {
///     "pins": { "relay": 10 },
///     "actuation": { "relay_pulse_ms": 800 },
///     "access": { "audit_policy": "all_reads" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    pub database: DatabaseConfig,

    pub gate: GateConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            database: DatabaseConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.gate.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiegate_access::AuditPolicy;

    #[test]
    fn test_no_path_means_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"database": {{"database_path": "gate.db"}}, "gate": {{"access": {{"audit_policy": "all_reads"}}}}}}"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database.database_path, "gate.db");
        assert!(config.database.create_if_missing);
        assert_eq!(config.gate.access.audit_policy, AuditPolicy::AllReads);
        assert_eq!(config.gate.actuation.relay_pulse_ms, 500);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_pins_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"gate": {{"pins": {{"d0": 7, "buzzer": 7}}}}}}"#).unwrap();
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.json"))).is_err());
    }
}
