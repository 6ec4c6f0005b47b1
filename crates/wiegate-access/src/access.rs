//! Access decisions.
//!
//! [`AccessController`] consumes decoded UIDs from the reader, looks them up
//! in the user registry and drives the actuator. Granted reads are written
//! to the audit log; denied reads are only logged when the policy says so.
//! Every read is reported to the mesh collaborator and recorded as the last
//! UID, whatever the outcome.

use crate::actuation::ActuationController;
use crate::clock::{Clock, SystemClock};
use crate::reporter::UidReporter;
use crate::status::LastUid;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, mpsc};
use tracing::{info, warn};
use wiegate_core::Uid;
use wiegate_core::constants::TIMESTAMP_FORMAT;
use wiegate_storage::{AuditLog, PersistenceAdapter, StorageResult, UserRegistry};

/// Which reads are written to the audit log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPolicy {
    /// Only granted reads.
    #[default]
    GrantsOnly,
    /// Granted and denied reads.
    AllReads,
}

/// Access worker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub audit_policy: AuditPolicy,
}

impl AccessConfig {
    /// Set the audit policy.
    pub fn with_audit_policy(mut self, policy: AuditPolicy) -> Self {
        self.audit_policy = policy;
        self
    }
}

/// Registry and audit log behind one lock.
#[derive(Debug)]
pub struct AccessStore<S> {
    pub users: UserRegistry<S>,
    pub logs: AuditLog<S>,
}

/// Store shared by the access worker and the management surface.
pub type SharedStore<S> = Arc<Mutex<AccessStore<S>>>;

impl<S: PersistenceAdapter> AccessStore<S> {
    /// Empty registry and log persisting to `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            users: UserRegistry::new(Arc::clone(&store)),
            logs: AuditLog::new(store),
        }
    }

    /// Restore registry and log from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read.
    pub async fn load(store: Arc<S>) -> StorageResult<Self> {
        Ok(Self {
            users: UserRegistry::load(Arc::clone(&store)).await?,
            logs: AuditLog::load(store).await?,
        })
    }

    /// Wrap for sharing.
    pub fn shared(self) -> SharedStore<S> {
        Arc::new(Mutex::new(self))
    }
}

/// Outcome of one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Granted { uid: String, name: String },
    Denied { uid: String },
}

impl Decision {
    /// Returns `true` for a grant.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Hex UID the decision was made for.
    pub fn uid(&self) -> &str {
        match self {
            Self::Granted { uid, .. } | Self::Denied { uid } => uid,
        }
    }
}

/// Counters reported when the access worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessStats {
    pub reads: u64,
    pub granted: u64,
    pub denied: u64,

    /// Audit appends that failed to persist.
    pub audit_failures: u64,
}

/// Access worker.
pub struct AccessController<S> {
    store: SharedStore<S>,
    actuation: ActuationController,
    reporter: Arc<dyn UidReporter>,
    clock: Arc<dyn Clock>,
    last_uid: LastUid,
    config: AccessConfig,
    decisions: Option<broadcast::Sender<Decision>>,
    stats: AccessStats,
}

impl<S: PersistenceAdapter> AccessController<S> {
    /// Create a worker stamping audit entries with the system clock.
    pub fn new(
        store: SharedStore<S>,
        actuation: ActuationController,
        reporter: Arc<dyn UidReporter>,
        last_uid: LastUid,
        config: AccessConfig,
    ) -> Self {
        Self {
            store,
            actuation,
            reporter,
            clock: Arc::new(SystemClock),
            last_uid,
            config,
            decisions: None,
            stats: AccessStats::default(),
        }
    }

    /// Use `clock` for audit timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish every decision on `decisions`.
    pub fn with_decisions(mut self, decisions: broadcast::Sender<Decision>) -> Self {
        self.decisions = Some(decisions);
        self
    }

    /// Decide on one decoded UID.
    ///
    /// The decision never depends on whether the audit append persists.
    pub async fn on_uid_decoded(&mut self, uid: Uid) -> Decision {
        self.stats.reads += 1;
        self.last_uid.set(uid);

        let hex = uid.to_hex();
        let store = Arc::clone(&self.store);
        let mut store = store.lock().await;

        let decision = match store.users.find(&hex) {
            Some(user) => Decision::Granted {
                uid: hex.clone(),
                name: user.name.clone(),
            },
            None => Decision::Denied { uid: hex.clone() },
        };

        let audit = match &decision {
            Decision::Granted { name, .. } => {
                self.stats.granted += 1;
                info!(uid = %hex, name = %name, bits = uid.bit_count(), "Access granted");
                self.actuation.grant();
                true
            }
            Decision::Denied { .. } => {
                self.stats.denied += 1;
                info!(uid = %hex, bits = uid.bit_count(), "Access denied");
                self.actuation.deny();
                self.config.audit_policy == AuditPolicy::AllReads
            }
        };

        if audit {
            let timestamp = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
            if let Err(e) = store.logs.append(&hex, &timestamp).await {
                self.stats.audit_failures += 1;
                warn!(uid = %hex, error = %e, "Audit append failed");
            }
        }
        drop(store);

        self.reporter.report_uid(&uid);
        if let Some(decisions) = &self.decisions {
            // No subscribers is fine
            let _ = decisions.send(decision.clone());
        }
        decision
    }

    /// Counters so far.
    pub fn stats(&self) -> AccessStats {
        self.stats
    }

    /// Process frames until the reader side closes.
    pub async fn run(mut self, mut frames: mpsc::Receiver<Uid>) -> AccessStats {
        info!(policy = ?self.config.audit_policy, "Access worker started");

        while let Some(uid) = frames.recv().await {
            self.on_uid_decoded(uid).await;
        }

        info!(
            reads = self.stats.reads,
            granted = self.stats.granted,
            denied = self.stats.denied,
            audit_failures = self.stats.audit_failures,
            "Access worker stopped"
        );
        self.stats
    }
}
