//! Volatile persistence adapter.
//!
//! Keeps committed values in a map and supports fault injection, so tests can
//! exercise the "persistence failed, memory already mutated" path.

use crate::adapter::{PersistenceAdapter, Staging};
use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    committed: BTreeMap<(String, String), Vec<u8>>,
    staging: Staging,
}

/// In-memory [`PersistenceAdapter`].
///
/// Clones share the same contents.
///
/// # Examples
///
/// ```
/// use wiegate_storage::{MemoryStore, PersistenceAdapter};
///
/// # #[tokio::main]
/// # async fn main() -> wiegate_storage::StorageResult<()> {
/// let store = MemoryStore::new();
/// store.put("users", "data", b"[]").await?;
/// assert!(store.committed("users", "data").await.is_none());
///
/// store.commit("users").await?;
/// assert_eq!(store.committed("users", "data").await.as_deref(), Some(&b"[]"[..]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    fail_writes: Arc<AtomicBool>,
    commits: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` and `commit` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful commits.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Durable value under `(namespace, key)`, ignoring staged writes.
    pub async fn committed(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .await
            .committed
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StorageError::Persistence(
                "simulated write failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl PersistenceAdapter for MemoryStore {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        self.check_writable()?;
        self.inner.lock().await.staging.put(namespace, key, value);
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let inner = self.inner.lock().await;
        if let Some(value) = inner.staging.get(namespace, key) {
            return Ok(Some(value.clone()));
        }
        Ok(inner
            .committed
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn commit(&self, namespace: &str) -> StorageResult<()> {
        let mut inner = self.inner.lock().await;
        let staged = inner.staging.take(namespace);
        self.check_writable()?;

        for (key, value) in staged {
            inner.committed.insert((namespace.to_string(), key), value);
        }
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
