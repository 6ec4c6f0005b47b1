pub mod log_entry;
pub mod settings;
pub mod user;

pub use log_entry::LogEntry;
pub use settings::{MeshSettings, NetworkSettings, WifiCredentials};
pub use user::{User, canonical_uid};
