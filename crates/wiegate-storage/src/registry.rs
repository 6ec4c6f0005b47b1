//! Persisted registry of authorized cards.
//!
//! The registry is a dense, ordered collection of at most [`MAX_USERS`]
//! users with unique UIDs. Removal swaps the last user into the freed slot.
//! Every mutation writes the whole collection plus its count to the `users`
//! namespace and commits before returning.
//!
//! A persistence failure is reported to the caller but the in-memory change
//! is kept: the registry reflects what the operator asked for even if flash
//! did not take it.

use crate::adapter::PersistenceAdapter;
use crate::error::{StorageError, StorageResult};
use crate::models::{User, canonical_uid};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wiegate_core::constants::{KEY_COUNT, KEY_DATA, MAX_USERS, NS_USERS};

/// Authorized user registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wiegate_storage::{MemoryStore, UserRegistry};
///
/// # #[tokio::main]
/// # async fn main() -> wiegate_storage::StorageResult<()> {
/// let store = Arc::new(MemoryStore::new());
/// let mut registry = UserRegistry::new(Arc::clone(&store));
///
/// registry.add("B4", "Alice").await?;
/// assert!(registry.is_authorized("b4"));
///
/// registry.remove("B4").await?;
/// assert!(!registry.is_authorized("B4"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UserRegistry<S> {
    store: Arc<S>,
    users: Vec<User>,
}

impl<S: PersistenceAdapter> UserRegistry<S> {
    /// Create an empty registry persisting to `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            users: Vec::new(),
        }
    }

    /// Restore the registry from `store`.
    ///
    /// Missing keys mean an empty registry. The stored count is clamped to
    /// the decoded collection and to [`MAX_USERS`]; invalid entries and
    /// duplicate UIDs are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the collection blob cannot be
    /// decoded.
    pub async fn load(store: Arc<S>) -> StorageResult<Self> {
        let count = store.get_u32(NS_USERS, KEY_COUNT).await?.unwrap_or(0) as usize;
        let stored: Vec<User> = match store.get(NS_USERS, KEY_DATA).await? {
            Some(blob) => serde_json::from_slice(&blob)?,
            None => Vec::new(),
        };

        let limit = count.min(stored.len()).min(MAX_USERS);
        if limit < count {
            warn!(count, loaded = limit, "Stored user count clamped");
        }

        let mut seen = HashSet::new();
        let mut users = Vec::with_capacity(limit);
        for entry in stored.into_iter().take(limit) {
            let user = match User::new(&entry.uid, &entry.name) {
                Ok(user) => user,
                Err(e) => {
                    warn!(uid = %entry.uid, error = %e, "Skipping invalid stored user");
                    continue;
                }
            };
            if !seen.insert(user.uid.clone()) {
                warn!(uid = %user.uid, "Skipping duplicate stored user");
                continue;
            }
            users.push(user);
        }

        info!(users = users.len(), "User registry loaded");
        Ok(Self { store, users })
    }

    /// Register a card.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Validation`] for an empty or over-long UID or name
    /// - [`StorageError::CapacityExceeded`] when [`MAX_USERS`] are registered
    /// - [`StorageError::DuplicateUid`] when the UID is already registered
    /// - a persistence error if the write fails (the user stays registered)
    pub async fn add(&mut self, uid: &str, name: &str) -> StorageResult<()> {
        let user = User::new(uid, name)?;

        if self.users.len() >= MAX_USERS {
            return Err(StorageError::CapacityExceeded {
                collection: NS_USERS,
                capacity: MAX_USERS,
            });
        }
        if self.position(&user.uid).is_some() {
            return Err(StorageError::duplicate_uid(user.uid));
        }

        debug!(uid = %user.uid, name = %user.name, "Adding user");
        self.users.push(user);
        self.persist().await
    }

    /// Unregister a card. The last user takes the freed slot.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UserNotFound`] if the UID is not registered
    /// - a persistence error if the write fails (the user stays removed)
    pub async fn remove(&mut self, uid: &str) -> StorageResult<()> {
        let uid = canonical_uid(uid)?;
        let index = self
            .position(&uid)
            .ok_or_else(|| StorageError::user_not_found(&uid))?;

        let removed = self.users.swap_remove(index);
        debug!(uid = %removed.uid, name = %removed.name, "Removed user");
        self.persist().await
    }

    /// Remove every user.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails (the registry stays
    /// empty).
    pub async fn clear(&mut self) -> StorageResult<()> {
        let removed = self.users.len();
        self.users.clear();
        info!(removed, "User registry cleared");
        self.persist().await
    }

    /// Returns `true` if `uid` is registered.
    ///
    /// Linear scan with constant-time comparison per entry.
    pub fn is_authorized(&self, uid: &str) -> bool {
        self.find(uid).is_some()
    }

    /// Registered user for `uid`, if any.
    pub fn find(&self, uid: &str) -> Option<&User> {
        let uid = canonical_uid(uid).ok()?;
        self.users.iter().find(|user| user.matches(&uid))
    }

    /// Snapshot of all users in registry order.
    pub fn list(&self) -> Vec<User> {
        self.users.clone()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no user is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn position(&self, canonical: &str) -> Option<usize> {
        self.users.iter().position(|user| user.matches(canonical))
    }

    async fn persist(&self) -> StorageResult<()> {
        let blob = serde_json::to_vec(&self.users)?;
        let count = self.users.len() as u32;

        let result = async {
            self.store.put(NS_USERS, KEY_DATA, &blob).await?;
            self.store.put_u32(NS_USERS, KEY_COUNT, count).await?;
            self.store.commit(NS_USERS).await
        }
        .await;

        if let Err(e) = &result {
            warn!(error = %e, users = count, "Failed to persist user registry");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn registry() -> (Arc<MemoryStore>, UserRegistry<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), UserRegistry::new(store))
    }

    #[tokio::test]
    async fn test_add_and_authorize() {
        let (store, mut registry) = registry();
        registry.add("B4", "Alice").await.unwrap();

        assert!(registry.is_authorized("B4"));
        assert!(registry.is_authorized(" b4"));
        assert!(!registry.is_authorized("B5"));
        assert_eq!(registry.find("B4").map(|u| u.name.as_str()), Some("Alice"));
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected_and_size_unchanged() {
        let (store, mut registry) = registry();
        registry.add("B4", "Alice").await.unwrap();

        let err = registry.add("b4", "Mallory").await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateUid { ref uid } if uid == "B4"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list()[0].name, "Alice");
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let (_store, mut registry) = registry();
        for i in 0..MAX_USERS {
            registry.add(&format!("{i:04X}"), "user").await.unwrap();
        }

        let err = registry.add("FFFF", "late").await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::CapacityExceeded {
                capacity: MAX_USERS,
                ..
            }
        ));
        assert_eq!(registry.len(), MAX_USERS);
    }

    #[tokio::test]
    async fn test_capacity_is_checked_before_duplicates() {
        let (_store, mut registry) = registry();
        for i in 0..MAX_USERS {
            registry.add(&format!("{i:04X}"), "user").await.unwrap();
        }
        let err = registry.add("0000", "again").await.unwrap_err();
        assert!(matches!(err, StorageError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn test_remove_swaps_last_into_slot() {
        let (_store, mut registry) = registry();
        registry.add("A1", "first").await.unwrap();
        registry.add("B2", "second").await.unwrap();
        registry.add("C3", "third").await.unwrap();

        registry.remove("a1").await.unwrap();

        let uids: Vec<_> = registry.list().into_iter().map(|u| u.uid).collect();
        assert_eq!(uids, ["C3", "B2"]);
        assert!(!registry.is_authorized("A1"));
    }

    #[tokio::test]
    async fn test_remove_unknown_uid() {
        let (store, mut registry) = registry();
        let err = registry.remove("B4").await.unwrap_err();
        assert!(matches!(err, StorageError::UserNotFound { .. }));
        assert_eq!(store.commits(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_memory_mutation() {
        let (store, mut registry) = registry();
        store.fail_writes(true);

        let err = registry.add("B4", "Alice").await.unwrap_err();
        assert!(err.is_persistence());
        assert!(registry.is_authorized("B4"));

        // Nothing reached the store
        store.fail_writes(false);
        let reloaded = UserRegistry::load(Arc::clone(&store)).await.unwrap();
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_registry() {
        let (store, mut registry) = registry();
        registry.add("B4", "Alice").await.unwrap();
        registry.clear().await.unwrap();

        assert!(registry.is_empty());
        assert_eq!(store.get_u32(NS_USERS, KEY_COUNT).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_reload_preserves_order() {
        let (store, mut registry) = registry();
        for (uid, name) in [("C3", "carol"), ("A1", "alice"), ("B2", "bob")] {
            registry.add(uid, name).await.unwrap();
        }

        let reloaded = UserRegistry::load(store).await.unwrap();
        assert_eq!(reloaded.list(), registry.list());
    }

    #[tokio::test]
    async fn test_load_clamps_count_to_blob() {
        let store = Arc::new(MemoryStore::new());
        let users = vec![User::new("A1", "alice").unwrap()];
        store
            .put(NS_USERS, KEY_DATA, &serde_json::to_vec(&users).unwrap())
            .await
            .unwrap();
        store.put_u32(NS_USERS, KEY_COUNT, 7).await.unwrap();

        let registry = UserRegistry::load(store).await.unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_load_honours_smaller_count() {
        let store = Arc::new(MemoryStore::new());
        let users = vec![
            User::new("A1", "alice").unwrap(),
            User::new("B2", "bob").unwrap(),
        ];
        store
            .put(NS_USERS, KEY_DATA, &serde_json::to_vec(&users).unwrap())
            .await
            .unwrap();
        store.put_u32(NS_USERS, KEY_COUNT, 1).await.unwrap();

        let registry = UserRegistry::load(store).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_authorized("B2"));
    }

    #[tokio::test]
    async fn test_load_drops_duplicates() {
        let store = Arc::new(MemoryStore::new());
        let users = vec![
            User::new("A1", "alice").unwrap(),
            User::new("A1", "again").unwrap(),
        ];
        store
            .put(NS_USERS, KEY_DATA, &serde_json::to_vec(&users).unwrap())
            .await
            .unwrap();
        store.put_u32(NS_USERS, KEY_COUNT, 2).await.unwrap();

        let registry = UserRegistry::load(store).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list()[0].name, "alice");
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_blob() {
        let store = Arc::new(MemoryStore::new());
        store.put(NS_USERS, KEY_DATA, b"not json").await.unwrap();
        store.put_u32(NS_USERS, KEY_COUNT, 1).await.unwrap();

        let err = UserRegistry::load(store).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
