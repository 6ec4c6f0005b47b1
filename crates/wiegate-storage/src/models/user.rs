use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use wiegate_core::constants::{MAX_NAME_LEN, MAX_UID_LEN};

/// Canonical registry form of a card UID: trimmed and uppercased.
///
/// # Errors
///
/// Returns [`StorageError::Validation`] if the UID is empty after trimming
/// or longer than [`MAX_UID_LEN`] characters.
///
/// # Examples
///
/// ```
/// use wiegate_storage::models::canonical_uid;
///
/// assert_eq!(canonical_uid(" b4 ").unwrap(), "B4");
/// assert!(canonical_uid("   ").is_err());
/// ```
pub fn canonical_uid(uid: &str) -> StorageResult<String> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(StorageError::Validation("UID must not be empty".to_string()));
    }
    if uid.chars().count() > MAX_UID_LEN {
        return Err(StorageError::Validation(format!(
            "UID exceeds {MAX_UID_LEN} characters"
        )));
    }
    Ok(uid.to_uppercase())
}

/// An authorized card holder.
///
/// # Examples
///
/// ```
/// use wiegate_storage::models::User;
///
/// let user = User::new("b4", "Alice").unwrap();
/// assert_eq!(user.uid, "B4");
/// assert!(user.matches("B4"));
/// assert!(!user.matches("B5"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Canonical UID (uppercase hex for decoded cards)
    pub uid: String,

    /// Display name
    pub name: String,
}

impl User {
    /// Create a user, canonicalizing the UID and validating both fields.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] for an empty or over-long UID or
    /// name.
    pub fn new(uid: &str, name: &str) -> StorageResult<Self> {
        let uid = canonical_uid(uid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::Validation("Name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(StorageError::Validation(format!(
                "Name exceeds {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self {
            uid,
            name: name.to_string(),
        })
    }

    /// Compare against a canonical UID in constant time.
    pub fn matches(&self, canonical: &str) -> bool {
        self.uid.as_bytes().ct_eq(canonical.as_bytes()).into()
    }
}
