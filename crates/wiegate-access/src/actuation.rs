//! Gate output actuation.
//!
//! [`Actuator`] owns the output pins and runs on its own task as a
//! timer-driven state machine. Callers hold a cloneable
//! [`ActuationController`] and never wait on the outputs: commands are queued
//! with `try_send` and dropped (with a warning) if the queue is full.
//!
//! # Timing
//!
//! | command | LED + buzzer | relay |
//! |---------|--------------|-------|
//! | grant   | 50 ms        | 500 ms pulse |
//! | deny    | 100 ms       | -     |
//! | open    | -            | 500 ms pulse |
//!
//! The relay is non-retriggerable: a grant or open arriving while a pulse is
//! active is coalesced. Its indication still runs but the pulse is neither
//! extended nor queued. A new indication extends a running one to the later
//! of the two end times.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wiegate_core::constants::{
    DEFAULT_ACTUATION_QUEUE_CAPACITY, DEFAULT_DENY_INDICATION_MS, DEFAULT_GRANT_INDICATION_MS,
    DEFAULT_RELAY_PULSE_MS,
};
use wiegate_hardware::{OutputLine, OutputPins};

/// Actuation timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuationConfig {
    /// LED and buzzer duration on grant
    pub grant_indication_ms: u64,

    /// LED and buzzer duration on deny
    pub deny_indication_ms: u64,

    /// Relay pulse duration
    pub relay_pulse_ms: u64,

    /// Pending command capacity
    pub queue_capacity: usize,
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            grant_indication_ms: DEFAULT_GRANT_INDICATION_MS,
            deny_indication_ms: DEFAULT_DENY_INDICATION_MS,
            relay_pulse_ms: DEFAULT_RELAY_PULSE_MS,
            queue_capacity: DEFAULT_ACTUATION_QUEUE_CAPACITY,
        }
    }
}

impl ActuationConfig {
    /// Set the relay pulse duration.
    pub fn with_relay_pulse_ms(mut self, ms: u64) -> Self {
        self.relay_pulse_ms = ms;
        self
    }

    /// Set the grant and deny indication durations.
    pub fn with_indication_ms(mut self, grant_ms: u64, deny_ms: u64) -> Self {
        self.grant_indication_ms = grant_ms;
        self.deny_indication_ms = deny_ms;
        self
    }

    /// Set the command queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    fn relay_pulse(&self) -> Duration {
        Duration::from_millis(self.relay_pulse_ms)
    }
}

/// Command accepted by the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationCommand {
    /// Access granted: indication then relay pulse.
    Grant,
    /// Access denied: indication only.
    Deny,
    /// Manual open: relay pulse only.
    Open,
}

/// Message on the actuator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Command(ActuationCommand),
    /// Drive every line low and stop.
    Shutdown,
}

/// Relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// De-energized.
    Idle,
    /// Energized until the deadline.
    Pulsing { until: Instant },
}

/// Counters reported when the actuator stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuationStats {
    pub grants: u64,
    pub denies: u64,
    pub opens: u64,

    /// Relay requests ignored because a pulse was already active.
    pub coalesced: u64,

    /// Output writes that failed.
    pub output_errors: u64,
}

/// Fire-and-forget handle to the actuator task.
#[derive(Debug, Clone)]
pub struct ActuationController {
    tx: mpsc::Sender<Request>,
}

impl ActuationController {
    /// Create a controller and the actuator it drives.
    ///
    /// The actuator does nothing until [`Actuator::run`] is polled.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegate_access::{ActuationConfig, ActuationController};
    /// use wiegate_hardware::mock::MockOutputs;
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let (outputs, _changes) = MockOutputs::new();
    ///     let (controller, actuator) = ActuationController::new(outputs, &ActuationConfig::default());
    ///     let task = tokio::spawn(actuator.run());
    ///
    ///     assert!(controller.grant());
    ///     drop(controller);
    ///
    ///     let stats = task.await.unwrap();
    ///     assert_eq!(stats.grants, 1);
    /// }
    /// ```
    pub fn new<P: OutputPins>(pins: P, config: &ActuationConfig) -> (Self, Actuator<P>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        (Self { tx }, Actuator::new(pins, config.clone(), rx))
    }

    /// Request a grant sequence. Returns `false` if the command was dropped.
    pub fn grant(&self) -> bool {
        self.submit(ActuationCommand::Grant)
    }

    /// Request a deny indication. Returns `false` if the command was dropped.
    pub fn deny(&self) -> bool {
        self.submit(ActuationCommand::Deny)
    }

    /// Request a relay pulse. Returns `false` if the command was dropped.
    pub fn open(&self) -> bool {
        self.submit(ActuationCommand::Open)
    }

    /// Ask the actuator to release every output and stop, waiting for queue
    /// space.
    ///
    /// Returns `false` if the actuator has already stopped.
    pub async fn shutdown(&self) -> bool {
        self.tx.send(Request::Shutdown).await.is_ok()
    }

    /// Returns `true` once the actuator has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn submit(&self, command: ActuationCommand) -> bool {
        match self.tx.try_send(Request::Command(command)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(?command, "Actuation queue full, command dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(?command, "Actuator stopped, command dropped");
                false
            }
        }
    }
}

/// Actuation worker owning the output pins.
#[derive(Debug)]
pub struct Actuator<P> {
    pins: P,
    config: ActuationConfig,
    commands: mpsc::Receiver<Request>,
    relay: RelayState,
    indication_until: Option<Instant>,
    stats: ActuationStats,
}

impl<P: OutputPins> Actuator<P> {
    fn new(pins: P, config: ActuationConfig, commands: mpsc::Receiver<Request>) -> Self {
        Self {
            pins,
            config,
            commands,
            relay: RelayState::Idle,
            indication_until: None,
            stats: ActuationStats::default(),
        }
    }

    /// Drive every output low, then process commands.
    ///
    /// Returns after [`ActuationController::shutdown`], or once every
    /// controller is dropped and the pending pulses have finished.
    pub async fn run(mut self) -> ActuationStats {
        if let Err(e) = self.pins.reset().await {
            warn!(error = %e, "Failed to reset outputs");
            self.stats.output_errors += 1;
        }
        match self.pins.get_info().await {
            Ok(device) => info!(
                device = %device.name,
                model = %device.model,
                relay_pulse_ms = self.config.relay_pulse_ms,
                "Actuator started"
            ),
            Err(e) => warn!(error = %e, "Output device info unavailable"),
        }

        let mut open = true;
        while open || !self.is_idle() {
            let deadline = self.next_deadline();

            tokio::select! {
                biased;

                command = self.commands.recv(), if open => match command {
                    Some(Request::Shutdown) => {
                        self.release_all().await;
                        break;
                    }
                    Some(Request::Command(command)) => self.handle(command, Instant::now()).await,
                    None => {
                        debug!("Actuation channel closed");
                        open = false;
                    }
                },

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.expire(Instant::now()).await;
                }
            }
        }

        info!(
            grants = self.stats.grants,
            denies = self.stats.denies,
            opens = self.stats.opens,
            coalesced = self.stats.coalesced,
            output_errors = self.stats.output_errors,
            "Actuator stopped"
        );
        self.stats
    }

    /// Current relay state.
    pub fn relay(&self) -> RelayState {
        self.relay
    }

    /// Returns `true` if no output is active.
    pub fn is_idle(&self) -> bool {
        self.relay == RelayState::Idle && self.indication_until.is_none()
    }

    async fn handle(&mut self, command: ActuationCommand, now: Instant) {
        match command {
            ActuationCommand::Grant => {
                self.stats.grants += 1;
                self.indicate(self.config.grant_indication_ms, now).await;
                self.pulse_relay(now).await;
            }
            ActuationCommand::Deny => {
                self.stats.denies += 1;
                self.indicate(self.config.deny_indication_ms, now).await;
            }
            ActuationCommand::Open => {
                self.stats.opens += 1;
                self.pulse_relay(now).await;
            }
        }
    }

    async fn indicate(&mut self, ms: u64, now: Instant) {
        let until = now + Duration::from_millis(ms);
        match self.indication_until {
            Some(current) => self.indication_until = Some(current.max(until)),
            None => {
                self.set(OutputLine::Led, true).await;
                self.set(OutputLine::Buzzer, true).await;
                self.indication_until = Some(until);
            }
        }
    }

    async fn pulse_relay(&mut self, now: Instant) {
        if let RelayState::Pulsing { until } = self.relay {
            self.stats.coalesced += 1;
            info!(
                remaining_ms = until.saturating_duration_since(now).as_millis() as u64,
                "Relay pulse active, request coalesced"
            );
            return;
        }

        self.set(OutputLine::Relay, true).await;
        self.relay = RelayState::Pulsing {
            until: now + self.config.relay_pulse(),
        };
        debug!(pulse_ms = self.config.relay_pulse_ms, "Relay energized");
    }

    async fn expire(&mut self, now: Instant) {
        if let Some(until) = self.indication_until
            && until <= now
        {
            self.set(OutputLine::Led, false).await;
            self.set(OutputLine::Buzzer, false).await;
            self.indication_until = None;
        }

        if let RelayState::Pulsing { until } = self.relay
            && until <= now
        {
            self.set(OutputLine::Relay, false).await;
            self.relay = RelayState::Idle;
            debug!("Relay released");
        }
    }

    async fn release_all(&mut self) {
        if let Err(e) = self.pins.reset().await {
            warn!(error = %e, "Failed to release outputs");
            self.stats.output_errors += 1;
        }
        self.indication_until = None;
        self.relay = RelayState::Idle;
    }

    fn next_deadline(&self) -> Option<Instant> {
        let relay = match self.relay {
            RelayState::Pulsing { until } => Some(until),
            RelayState::Idle => None,
        };
        match (self.indication_until, relay) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    async fn set(&mut self, line: OutputLine, high: bool) {
        if let Err(e) = self.pins.set_output(line, high).await {
            warn!(%line, high, error = %e, "Output write failed");
            self.stats.output_errors += 1;
        }
    }
}
