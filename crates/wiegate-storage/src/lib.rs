//! Persistence for the Wiegand access controller.
//!
//! This crate provides the authorized-user registry, the audit log and the
//! device settings, all persisted through a namespaced key-value
//! [`PersistenceAdapter`].
//!
//! # Architecture
//!
//! - [`PersistenceAdapter`] - blob store with atomic per-namespace commit
//! - [`SqliteStore`] - SQLite implementation with embedded migrations
//! - [`MemoryStore`] - volatile implementation with fault injection
//! - [`UserRegistry`] - up to 50 unique cards, swap-remove, full rewrite on
//!   every mutation
//! - [`AuditLog`] - 50-entry FIFO of granted reads
//!
//! # Layout
//!
//! | namespace | keys                                      |
//! |-----------|-------------------------------------------|
//! | `storage` | `wifi_ssid`, `wifi_pass`, `zb_chan`, `zb_panid` |
//! | `users`   | `count` (u32 LE), `data` (JSON array)     |
//! | `logs`    | `count` (u32 LE), `data` (JSON array)     |
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use wiegate_storage::{AnyStore, DatabaseConfig, SqliteStore, UserRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new(DatabaseConfig::new("wiegate.db")).await?;
//! let store = Arc::new(AnyStore::from(store));
//!
//! let mut registry = UserRegistry::load(store).await?;
//! registry.add("B4", "Alice").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! UID lookups compare each stored UID in constant time via the `subtle`
//! crate. All SQL is parameterized.

pub mod adapter;
pub mod audit;
pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod registry;

pub use adapter::{AnyStore, PersistenceAdapter};
pub use audit::AuditLog;
pub use connection::{DatabaseConfig, SqliteStore};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use models::{LogEntry, MeshSettings, NetworkSettings, User, WifiCredentials};
pub use registry::UserRegistry;
