//! Persisted audit log.
//!
//! Fixed-capacity FIFO of [`LogEntry`] records in append order. When the log
//! holds [`MAX_LOGS`] entries the oldest is evicted before the new one is
//! appended; the log never rejects an entry for lack of room.

use crate::adapter::PersistenceAdapter;
use crate::error::StorageResult;
use crate::models::LogEntry;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{info, trace, warn};
use wiegate_core::constants::{KEY_COUNT, KEY_DATA, MAX_LOGS, NS_LOGS};

/// Bounded audit log.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wiegate_storage::{AuditLog, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() -> wiegate_storage::StorageResult<()> {
/// let mut log = AuditLog::new(Arc::new(MemoryStore::new()));
/// log.append("B4", "2025-08-25 12:00:00").await?;
///
/// let entries = log.list();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].uid, "B4");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuditLog<S> {
    store: Arc<S>,
    entries: VecDeque<LogEntry>,
}

impl<S: PersistenceAdapter> AuditLog<S> {
    /// Create an empty log persisting to `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            entries: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    /// Restore the log from `store`, clamping like the user registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the blob cannot be decoded.
    pub async fn load(store: Arc<S>) -> StorageResult<Self> {
        let count = store.get_u32(NS_LOGS, KEY_COUNT).await?.unwrap_or(0) as usize;
        let stored: Vec<LogEntry> = match store.get(NS_LOGS, KEY_DATA).await? {
            Some(blob) => serde_json::from_slice(&blob)?,
            None => Vec::new(),
        };

        let limit = count.min(stored.len());
        if limit < count {
            warn!(count, loaded = limit, "Stored log count clamped");
        }

        // Keep the newest entries if the stored log is somehow oversized
        let skip = limit.saturating_sub(MAX_LOGS);
        let entries: VecDeque<LogEntry> = stored.into_iter().take(limit).skip(skip).collect();

        info!(entries = entries.len(), "Audit log loaded");
        Ok(Self { store, entries })
    }

    /// Append an entry, evicting the oldest when full, then persist.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid UID or timestamp, or a
    /// persistence error if the write fails (the entry stays in memory).
    pub async fn append(&mut self, uid: &str, timestamp: &str) -> StorageResult<()> {
        let entry = LogEntry::new(uid, timestamp)?;
        self.push(entry).await
    }

    /// Append a prepared entry, evicting the oldest when full, then persist.
    pub async fn push(&mut self, entry: LogEntry) -> StorageResult<()> {
        if self.entries.len() >= MAX_LOGS
            && let Some(evicted) = self.entries.pop_front()
        {
            trace!(uid = %evicted.uid, timestamp = %evicted.timestamp, "Evicted oldest log entry");
        }
        self.entries.push_back(entry);
        self.persist().await
    }

    /// Chronological snapshot, oldest first.
    pub fn list(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn persist(&self) -> StorageResult<()> {
        let blob = serde_json::to_vec(&self.entries)?;
        let count = self.entries.len() as u32;

        let result = async {
            self.store.put(NS_LOGS, KEY_DATA, &blob).await?;
            self.store.put_u32(NS_LOGS, KEY_COUNT, count).await?;
            self.store.commit(NS_LOGS).await
        }
        .await;

        if let Err(e) = &result {
            warn!(error = %e, entries = count, "Failed to persist audit log");
        }
        result
    }
}
