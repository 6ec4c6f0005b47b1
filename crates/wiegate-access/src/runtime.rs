//! Gate pipeline wiring.
//!
//! [`GateRuntime`] spawns the three workers and connects them:
//!
//! ```text
//! edge callbacks -> PulseChannel -> reader -> frames -> access -> commands -> actuator
//! ```
//!
//! Outputs and store are the enum-dispatch types so the spawned futures are
//! concrete (and therefore `Send`).

use crate::access::{AccessController, AccessStats, Decision, SharedStore};
use crate::actuation::{ActuationController, ActuationStats};
use crate::clock::Clock;
use crate::config::GateConfig;
use crate::error::Result;
use crate::management::ManagementService;
use crate::reporter::UidReporter;
use crate::status::LastUid;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};
use wiegate_hardware::{AnyOutputPins, PulseConsumer};
use wiegate_storage::AnyStore;
use wiegate_wiegand::{ReaderStats, WiegandReader};

const DECISION_CAPACITY: usize = 16;

/// Collaborators handed to [`GateRuntime::start`].
pub struct GateParts {
    /// Consumer half of the pulse channel fed by the edge callbacks
    pub pulses: PulseConsumer,

    /// Output pins driven by the actuator
    pub outputs: AnyOutputPins,

    /// Registry and audit log
    pub store: SharedStore<AnyStore>,

    /// Mesh reporting collaborator
    pub reporter: Arc<dyn UidReporter>,

    /// Audit timestamp source
    pub clock: Arc<dyn Clock>,
}

/// Running gate pipeline.
pub struct GateRuntime {
    management: ManagementService<AnyStore>,
    actuation: ActuationController,
    decisions: broadcast::Sender<Decision>,
    reader: JoinHandle<ReaderStats>,
    access: JoinHandle<AccessStats>,
    actuator: JoinHandle<ActuationStats>,
    gap: Duration,
}

/// Worker statistics collected at shutdown. A worker that was cancelled or
/// panicked has no stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeReport {
    pub reader: Option<ReaderStats>,
    pub access: Option<AccessStats>,
    pub actuation: Option<ActuationStats>,

    /// Workers that panicked.
    pub panicked: usize,
}

/// Task termination classification for shutdown handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    Finished,
    Cancelled,
    Panic,
}

impl GateRuntime {
    /// Validate `config` and spawn the reader, access and actuation workers.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid pin assignment.
    pub fn start(config: &GateConfig, parts: GateParts) -> Result<Self> {
        config.validate()?;

        let (frames_tx, frames_rx) = mpsc::channel(config.reader.frame_queue_capacity.max(1));
        let (actuation, actuator) = ActuationController::new(parts.outputs, &config.actuation);
        let last_uid = LastUid::new();
        let (decisions, _) = broadcast::channel(DECISION_CAPACITY);

        let reader = WiegandReader::new(parts.pulses, &config.reader, frames_tx);
        let access = AccessController::new(
            Arc::clone(&parts.store),
            actuation.clone(),
            parts.reporter,
            last_uid.clone(),
            config.access.clone(),
        )
        .with_clock(parts.clock)
        .with_decisions(decisions.clone());
        let management = ManagementService::new(parts.store, last_uid, actuation.clone());

        let actuator = tokio::spawn(actuator.run());
        let access = tokio::spawn(access.run(frames_rx));
        let reader = tokio::spawn(reader.run());

        info!(
            gap_ms = config.reader.gap_ms,
            relay_pulse_ms = config.actuation.relay_pulse_ms,
            "Gate runtime started"
        );

        Ok(Self {
            management,
            actuation,
            decisions,
            reader,
            access,
            actuator,
            gap: config.reader.gap(),
        })
    }

    /// Management handle for this runtime.
    pub fn management(&self) -> ManagementService<AnyStore> {
        self.management.clone()
    }

    /// Receiver for decisions made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Decision> {
        self.decisions.subscribe()
    }

    /// Stop every worker and release the outputs.
    ///
    /// The reader gets two frame gaps to finish on its own (it does as soon
    /// as the pulse producer is dropped) and is cancelled after that, by
    /// which time any frame in progress has been emitted. Frames
    /// already assembled are still decided, then the actuator drives every
    /// line low.
    pub async fn shutdown(self) -> RuntimeReport {
        let mut reader = self.reader;
        let result = match tokio::time::timeout(self.gap * 2, &mut reader).await {
            Ok(result) => result,
            Err(_) => {
                reader.abort();
                reader.await
            }
        };

        let mut report = RuntimeReport::default();

        let (termination, stats) = Self::classify_task_result("reader", result);
        report.reader = stats;
        report.panicked += usize::from(termination == TaskTermination::Panic);

        let (termination, stats) = Self::classify_task_result("access", self.access.await);
        report.access = stats;
        report.panicked += usize::from(termination == TaskTermination::Panic);

        self.actuation.shutdown().await;
        let (termination, stats) = Self::classify_task_result("actuator", self.actuator.await);
        report.actuation = stats;
        report.panicked += usize::from(termination == TaskTermination::Panic);

        info!(panicked = report.panicked, "Gate runtime stopped");
        report
    }

    /// Classify the termination status of a worker.
    fn classify_task_result<T>(
        task: &'static str,
        result: std::result::Result<T, JoinError>,
    ) -> (TaskTermination, Option<T>) {
        match result {
            Ok(stats) => (TaskTermination::Finished, Some(stats)),
            Err(e) if e.is_cancelled() => {
                debug!(task, "Worker cancelled");
                (TaskTermination::Cancelled, None)
            }
            Err(e) => {
                error!(task, error = %e, "Worker panicked");
                (TaskTermination::Panic, None)
            }
        }
    }
}
