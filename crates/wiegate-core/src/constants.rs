//! Core constants for the Wiegand access controller.
//!
//! This module gathers every fixed limit and default used across the workspace:
//! frame geometry, registry and log capacities, actuation timings and the
//! persistence layout. Crates import these instead of repeating literals so the
//! decoder, the store and the actuator always agree.
//!
//! # Wiegand Framing
//!
//! A Wiegand reader signals each bit as a short low pulse on one of two lines:
//!
//! ```text
//! D0 ‾‾‾|_|‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! D1 ‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾|_|‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!       0    1    0    1    1          ^ silence > FRAME_GAP_MS ends the frame
//! ```
//!
//! There is no start or stop marker: a frame ends when no edge arrives for
//! [`DEFAULT_FRAME_GAP_MS`].
//!
//! # Usage
//!
//! ```
//! use wiegate_core::constants::*;
//!
//! assert_eq!(MAX_FRAME_BITS.div_ceil(8), 8);
//! assert!(MAX_UID_BYTES * 8 >= MAX_FRAME_BITS);
//! assert_eq!(MAX_USERS, 50);
//! ```

// ============================================================================
// Frame Geometry
// ============================================================================

/// Maximum number of bits accumulated into a single frame.
///
/// Common card formats are 26 to 58 bits long. Bits arriving after the cap
/// is reached are dropped, but they still restart the idle timer.
pub const MAX_FRAME_BITS: usize = 64;

/// Capacity of a [`Uid`](crate::Uid) in bytes.
///
/// A 64-bit frame packs into 8 bytes; the extra room matches the reporting
/// payload, which carries up to 16 bytes.
pub const MAX_UID_BYTES: usize = 16;

/// Default inter-bit silence that terminates a frame, in milliseconds.
pub const DEFAULT_FRAME_GAP_MS: u64 = 40;

/// Default capacity of the edge-to-worker pulse channel.
///
/// Must be a power of two. Two full 64-bit frames fit before edges are dropped.
pub const DEFAULT_PULSE_CHANNEL_CAPACITY: usize = 128;

/// Default capacity of the frame channel between the reader and access workers.
pub const DEFAULT_FRAME_QUEUE_CAPACITY: usize = 16;

// ============================================================================
// Registry and Audit Log Limits
// ============================================================================

/// Maximum number of authorized users held by the registry.
pub const MAX_USERS: usize = 50;

/// Maximum number of entries held by the audit log before FIFO eviction.
pub const MAX_LOGS: usize = 50;

/// Maximum length of a registry UID string, in characters.
pub const MAX_UID_LEN: usize = 31;

/// Maximum length of a user name, in characters.
pub const MAX_NAME_LEN: usize = 63;

/// Maximum length of an audit timestamp string, in characters.
pub const MAX_TIMESTAMP_LEN: usize = 31;

/// Timestamp layout used for audit entries (`2025-08-25 12:00:00`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Actuation Timing
// ============================================================================

/// Relay pulse length for a granted access, in milliseconds.
pub const DEFAULT_RELAY_PULSE_MS: u64 = 500;

/// LED and buzzer indication length for a granted access, in milliseconds.
pub const DEFAULT_GRANT_INDICATION_MS: u64 = 50;

/// LED and buzzer indication length for a denied access, in milliseconds.
pub const DEFAULT_DENY_INDICATION_MS: u64 = 100;

/// Capacity of the actuation command queue.
pub const DEFAULT_ACTUATION_QUEUE_CAPACITY: usize = 8;

// ============================================================================
// Persistence Layout
// ============================================================================

/// Namespace holding device and network settings.
pub const NS_SETTINGS: &str = "storage";

/// Namespace holding the user registry.
pub const NS_USERS: &str = "users";

/// Namespace holding the audit log.
pub const NS_LOGS: &str = "logs";

/// Key of the element counter inside a collection namespace.
pub const KEY_COUNT: &str = "count";

/// Key of the serialized collection inside a collection namespace.
pub const KEY_DATA: &str = "data";

// ============================================================================
// Mesh Reporting
// ============================================================================

/// Endpoint exposing the last-UID attribute.
pub const MESH_ENDPOINT: u8 = 10;

/// Vendor cluster carrying the last-UID attribute.
pub const MESH_CLUSTER_ID: u16 = 0xFC00;

/// Attribute identifier of the last decoded UID.
pub const MESH_ATTR_LAST_UID: u16 = 0x0001;

/// Short address of the coordinator receiving attribute reports.
pub const MESH_COORDINATOR_ADDR: u16 = 0x0000;

/// Endpoint on the coordinator receiving attribute reports.
pub const MESH_COORDINATOR_ENDPOINT: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_channel_capacity_is_power_of_two() {
        assert!(DEFAULT_PULSE_CHANNEL_CAPACITY.is_power_of_two());
        assert!(DEFAULT_PULSE_CHANNEL_CAPACITY >= MAX_FRAME_BITS);
    }

    #[test]
    fn test_uid_capacity_covers_full_frame() {
        assert!(MAX_UID_BYTES * 8 >= MAX_FRAME_BITS);
        // Hex form of the largest frame still fits the registry field
        assert!(MAX_FRAME_BITS.div_ceil(8) * 2 <= MAX_UID_LEN);
    }

    #[test]
    fn test_grant_indication_shorter_than_relay() {
        assert!(DEFAULT_GRANT_INDICATION_MS < DEFAULT_RELAY_PULSE_MS);
        assert!(DEFAULT_GRANT_INDICATION_MS < DEFAULT_DENY_INDICATION_MS);
    }
}
