//! Management surface.
//!
//! Operations an HTTP or console front end exposes: user administration,
//! audit log listing, status, and manual gate control. All registry and log
//! access goes through the same lock as the access worker.

use crate::access::SharedStore;
use crate::actuation::ActuationController;
use crate::error::{AccessError, Result};
use crate::status::{LastUid, StatusSnapshot};
use std::sync::Arc;
use tracing::info;
use wiegate_storage::{LogEntry, PersistenceAdapter, StorageResult, User};

/// Handle to the management operations. Clones share state.
pub struct ManagementService<S> {
    store: SharedStore<S>,
    last_uid: LastUid,
    actuation: ActuationController,
}

impl<S> Clone for ManagementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            last_uid: self.last_uid.clone(),
            actuation: self.actuation.clone(),
        }
    }
}

impl<S: PersistenceAdapter> ManagementService<S> {
    pub fn new(store: SharedStore<S>, last_uid: LastUid, actuation: ActuationController) -> Self {
        Self {
            store,
            last_uid,
            actuation,
        }
    }

    /// Registered users in registry order.
    pub async fn list_users(&self) -> Vec<User> {
        self.store.lock().await.users.list()
    }

    /// Audit entries, oldest first.
    pub async fn list_logs(&self) -> Vec<LogEntry> {
        self.store.lock().await.logs.list()
    }

    /// Register a card.
    ///
    /// # Errors
    ///
    /// See [`UserRegistry::add`](wiegate_storage::UserRegistry::add).
    pub async fn add_user(&self, uid: &str, name: &str) -> StorageResult<()> {
        self.store.lock().await.users.add(uid, name).await
    }

    /// Unregister a card.
    ///
    /// # Errors
    ///
    /// See [`UserRegistry::remove`](wiegate_storage::UserRegistry::remove).
    pub async fn remove_user(&self, uid: &str) -> StorageResult<()> {
        self.store.lock().await.users.remove(uid).await
    }

    /// Unregister every card.
    pub async fn clear_users(&self) -> StorageResult<()> {
        self.store.lock().await.users.clear().await
    }

    /// Last decoded UID.
    pub fn status(&self) -> StatusSnapshot {
        self.last_uid.snapshot()
    }

    /// Forget the last decoded UID.
    pub fn clear_last_uid(&self) {
        self.last_uid.clear();
        info!("Last UID cleared");
    }

    /// Pulse the relay without a card read.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::ActuationUnavailable`] if the command could not
    /// be queued.
    pub fn open_gate(&self) -> Result<()> {
        if self.actuation.open() {
            info!("Manual open requested");
            Ok(())
        } else {
            Err(AccessError::ActuationUnavailable(
                "open command was not queued".to_string(),
            ))
        }
    }
}
