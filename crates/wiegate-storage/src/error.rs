use thiserror::Error;

/// Storage-specific error types for the access controller.
///
/// These errors cover registry and audit log rule violations as well as
/// failures of the persistence engine underneath them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored collection could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The UID is already registered
    #[error("Duplicate UID: {uid} is already registered")]
    DuplicateUid { uid: String },

    /// The collection is full
    #[error("Capacity exceeded: {collection} holds at most {capacity} entries")]
    CapacityExceeded {
        collection: &'static str,
        capacity: usize,
    },

    /// No user with this UID
    #[error("User not found: {uid}")]
    UserNotFound { uid: String },

    /// Writing or committing to the store failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create a duplicate UID error.
    pub fn duplicate_uid(uid: impl Into<String>) -> Self {
        Self::DuplicateUid { uid: uid.into() }
    }

    /// Create a user not found error.
    pub fn user_not_found(uid: impl Into<String>) -> Self {
        Self::UserNotFound { uid: uid.into() }
    }

    /// Returns `true` if the error came from the persistence engine rather
    /// than from a registry or log rule.
    ///
    /// When this is `true` for a mutation, the in-memory collection has
    /// already been updated.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Migration(_) | Self::Persistence(_) | Self::Serialization(_)
        )
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
