use crate::error::{StorageError, StorageResult};
use crate::models::canonical_uid;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use wiegate_core::constants::{MAX_TIMESTAMP_LEN, TIMESTAMP_FORMAT};

/// One audit record: which card was granted, and when.
///
/// The timestamp is supplied by the caller and stored verbatim; it is not
/// checked for monotonicity.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use wiegate_storage::models::LogEntry;
///
/// let at = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();
/// let entry = LogEntry::at("b4", at).unwrap();
/// assert_eq!(entry.uid, "B4");
/// assert_eq!(entry.timestamp, "2025-08-25 12:00:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Canonical UID of the card
    pub uid: String,

    /// Caller-supplied timestamp text
    pub timestamp: String,
}

impl LogEntry {
    /// Create an entry from a UID and a timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] for an invalid UID or a timestamp
    /// longer than [`MAX_TIMESTAMP_LEN`] characters.
    pub fn new(uid: &str, timestamp: &str) -> StorageResult<Self> {
        let uid = canonical_uid(uid)?;
        if timestamp.chars().count() > MAX_TIMESTAMP_LEN {
            return Err(StorageError::Validation(format!(
                "Timestamp exceeds {MAX_TIMESTAMP_LEN} characters"
            )));
        }
        Ok(Self {
            uid,
            timestamp: timestamp.to_string(),
        })
    }

    /// Create an entry stamped with `at`, formatted as
    /// [`TIMESTAMP_FORMAT`].
    pub fn at<Tz>(uid: &str, at: DateTime<Tz>) -> StorageResult<Self>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self::new(uid, &at.format(TIMESTAMP_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_timestamp_length_limit() {
        assert!(LogEntry::new("B4", &"9".repeat(MAX_TIMESTAMP_LEN)).is_ok());
        assert!(LogEntry::new("B4", &"9".repeat(MAX_TIMESTAMP_LEN + 1)).is_err());
    }

    #[test]
    fn test_timestamp_is_not_parsed() {
        let entry = LogEntry::new("B4", "not a date").unwrap();
        assert_eq!(entry.timestamp, "not a date");
    }

    #[test]
    fn test_at_uses_local_wall_clock_of_offset() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let at = Utc
            .with_ymd_and_hms(2025, 8, 25, 9, 30, 5)
            .unwrap()
            .with_timezone(&offset);
        let entry = LogEntry::at("B4", at).unwrap();
        assert_eq!(entry.timestamp, "2025-08-25 12:30:05");
    }
}
