//! Namespaced key-value persistence.
//!
//! The registry, the audit log and the device settings all persist through
//! [`PersistenceAdapter`]: opaque byte values addressed by `(namespace, key)`.
//! Writes are staged and only become durable on [`commit`], which applies
//! every staged write of a namespace atomically. Reads observe staged writes.
//!
//! [`commit`]: PersistenceAdapter::commit

#![allow(async_fn_in_trait)]

use crate::connection::SqliteStore;
use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStore;
use std::collections::BTreeMap;

/// Namespaced blob store with atomic per-namespace commit.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024), so it is not
/// object-safe. Use a generic parameter or [`AnyStore`].
pub trait PersistenceAdapter: Send + Sync {
    /// Stage `value` under `(namespace, key)`.
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Read the value under `(namespace, key)`; `None` if absent.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Make every staged write of `namespace` durable, all or nothing.
    ///
    /// Staged writes are discarded when the commit fails.
    async fn commit(&self, namespace: &str) -> StorageResult<()>;

    /// Stage a `u32` (little-endian).
    async fn put_u32(&self, namespace: &str, key: &str, value: u32) -> StorageResult<()> {
        self.put(namespace, key, &value.to_le_bytes()).await
    }

    /// Read a `u32` written by [`put_u32`](Self::put_u32).
    async fn get_u32(&self, namespace: &str, key: &str) -> StorageResult<Option<u32>> {
        match self.get(namespace, key).await? {
            None => Ok(None),
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::Persistence(format!(
                        "{namespace}/{key}: expected 4 bytes, found {}",
                        bytes.len()
                    ))
                })?;
                Ok(Some(u32::from_le_bytes(raw)))
            }
        }
    }

    /// Stage a UTF-8 string.
    async fn put_str(&self, namespace: &str, key: &str, value: &str) -> StorageResult<()> {
        self.put(namespace, key, value.as_bytes()).await
    }

    /// Read a UTF-8 string.
    async fn get_str(&self, namespace: &str, key: &str) -> StorageResult<Option<String>> {
        match self.get(namespace, key).await? {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                StorageError::Persistence(format!("{namespace}/{key}: invalid UTF-8: {e}"))
            }),
        }
    }
}

/// Writes staged per namespace until commit.
#[derive(Debug, Default)]
pub(crate) struct Staging {
    pending: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl Staging {
    pub(crate) fn put(&mut self, namespace: &str, key: &str, value: &[u8]) {
        self.pending
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
    }

    pub(crate) fn get(&self, namespace: &str, key: &str) -> Option<&Vec<u8>> {
        self.pending.get(namespace).and_then(|keys| keys.get(key))
    }

    /// Remove and return every staged write of `namespace`.
    pub(crate) fn take(&mut self, namespace: &str) -> BTreeMap<String, Vec<u8>> {
        self.pending.remove(namespace).unwrap_or_default()
    }
}

/// Enum wrapper for persistence adapter dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyStore {
    /// Volatile store for tests and simulation.
    Memory(MemoryStore),

    /// SQLite-backed store.
    Sqlite(SqliteStore),
}

impl From<MemoryStore> for AnyStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<SqliteStore> for AnyStore {
    fn from(store: SqliteStore) -> Self {
        Self::Sqlite(store)
    }
}

impl PersistenceAdapter for AnyStore {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        match self {
            Self::Memory(store) => store.put(namespace, key, value).await,
            Self::Sqlite(store) => store.put(namespace, key, value).await,
        }
    }

    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match self {
            Self::Memory(store) => store.get(namespace, key).await,
            Self::Sqlite(store) => store.get(namespace, key).await,
        }
    }

    async fn commit(&self, namespace: &str) -> StorageResult<()> {
        match self {
            Self::Memory(store) => store.commit(namespace).await,
            Self::Sqlite(store) => store.commit(namespace).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_u32_round_trip_is_little_endian() {
        let store = MemoryStore::new();
        store.put_u32("users", "count", 0x0102_0304).await.unwrap();

        let raw = store.get("users", "count").await.unwrap().unwrap();
        assert_eq!(raw, vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(store.get_u32("users", "count").await.unwrap(), Some(0x0102_0304));
    }

    #[tokio::test]
    async fn test_get_u32_rejects_wrong_width() {
        let store = MemoryStore::new();
        store.put("users", "count", &[1, 2]).await.unwrap();

        let err = store.get_u32("users", "count").await.unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn test_missing_keys_read_as_none() {
        let store = AnyStore::from(MemoryStore::new());
        assert!(store.get("logs", "data").await.unwrap().is_none());
        assert!(store.get_u32("logs", "count").await.unwrap().is_none());
        assert!(store.get_str("storage", "wifi_ssid").await.unwrap().is_none());
    }

    #[test]
    fn test_staging_take_is_per_namespace() {
        let mut staging = Staging::default();
        staging.put("users", "count", &[1]);
        staging.put("logs", "count", &[2]);

        let users = staging.take("users");
        assert_eq!(users.len(), 1);
        assert!(staging.get("users", "count").is_none());
        assert_eq!(staging.get("logs", "count"), Some(&vec![2]));
    }
}
