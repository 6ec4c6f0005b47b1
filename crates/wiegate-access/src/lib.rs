//! Access control for a Wiegand card reader gate.
//!
//! Decoded UIDs from [`wiegate_wiegand`] are checked against the persisted
//! user registry; granted reads pulse the door relay and land in the audit
//! log.
//!
//! # Architecture
//!
//! - [`AccessController`] - per-read decision, audit append, mesh report
//! - [`ActuationController`] / [`Actuator`] - LED, buzzer and relay timing
//! - [`ManagementService`] - user administration, status, manual open
//! - [`GateRuntime`] - spawns and stops the workers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wiegate_access::{AccessStore, GateConfig, GateParts, GateRuntime, SystemClock, TracingReporter};
//! use wiegate_hardware::mock::{MockOutputs, MockWiegandReader};
//! use wiegate_storage::{AnyStore, MemoryStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(AnyStore::from(MemoryStore::new()));
//!     let store = AccessStore::load(store).await?.shared();
//!
//!     let (card, pulses) = MockWiegandReader::new(128);
//!     let (outputs, _changes) = MockOutputs::new();
//!     let runtime = GateRuntime::start(
//!         &GateConfig::default(),
//!         GateParts {
//!             pulses,
//!             outputs: outputs.into(),
//!             store,
//!             reporter: Arc::new(TracingReporter),
//!             clock: Arc::new(SystemClock),
//!         },
//!     )?;
//!
//!     let management = runtime.management();
//!     management.add_user("B4", "Alice").await?;
//!
//!     card.present_str("10110100").await?;
//!     drop(card);
//!
//!     let report = runtime.shutdown().await;
//!     assert_eq!(report.access.map(|s| s.granted), Some(1));
//!     assert_eq!(management.list_logs().await.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod actuation;
pub mod clock;
pub mod config;
pub mod error;
pub mod management;
pub mod reporter;
pub mod runtime;
pub mod status;

pub use access::{
    AccessConfig, AccessController, AccessStats, AccessStore, AuditPolicy, Decision, SharedStore,
};
pub use actuation::{
    ActuationCommand, ActuationConfig, ActuationController, ActuationStats, Actuator, RelayState,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::GateConfig;
pub use error::{AccessError, Result};
pub use management::ManagementService;
pub use reporter::{AttributeReport, ChannelReporter, TracingReporter, UidReporter};
pub use runtime::{GateParts, GateRuntime, RuntimeReport};
pub use status::{LastUid, StatusSnapshot};
