//! Reconciler: owns the context and runs the guarded write path.
//!
//! ```text
//!  RawDeviceEvent ─▶ gate ─▶ clamp ─▶ change ─▶ StatePublisher
//!                                        │
//!                                        └────▶ ControlQueue ─▶ control pass
//!  Option<f32> ────────────────────────────────▶ ValveSlot ───▶ waiter
//!  window sensor ─▶ WindowMonitor ─(delay)─▶ set_window_open ─▶ ControlQueue
//!  temperature, clock ─────────────────────────────────────────▶ ControlQueue
//! ```
//!
//! Every method that mutates the context takes `&mut self` and runs to
//! completion without suspending, so a change and its queued control
//! request are never split by another event.

use std::sync::Arc;

use log::{debug, error, info, warn};

use super::context::{ManagedMode, ObservableState, ReconciliationContext};
use super::gate::{Rejection, admit};
use super::ports::StatePublisher;
use super::setpoint::{ChangeSet, apply_change, clamp_setpoint, detect_change};
use crate::config::{ClockTime, ThermostatConfig};
use crate::device::RawDeviceEvent;
use crate::error::ConfigError;
use crate::sync::{ControlQueue, ValveSlot};
use crate::window::WindowMonitor;

/// Sensor states that carry no reading.
const NO_READING: [&str; 2] = ["unavailable", "unknown"];

/// Handle queued for the control pass.  Carries no state; the consumer
/// re-reads the context.  `generation` identifies which change queued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub generation: u64,
}

/// Result of feeding one device event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Dropped by a guard; nothing changed.
    Rejected(Rejection),
    /// Passed the gate but matched the held state.
    Unchanged,
    /// State changed, was published, and a control request was queued.
    Updated(ChangeSet),
}

/// Running counters, mostly for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub events: u32,
    pub rejected: u32,
    pub unchanged: u32,
    pub updated: u32,
    pub clamped: u32,
    /// Accepted external temperature readings.
    pub temperature_readings: u32,
}

pub struct Reconciler {
    config: ThermostatConfig,
    ctx: ReconciliationContext,
    queue: Arc<ControlQueue<ControlRequest>>,
    valve: Arc<ValveSlot>,
    window: Arc<WindowMonitor>,
    stats: ReconcileStats,
}

impl Reconciler {
    /// Build a reconciler for a controller that is starting up.
    pub fn new(config: ThermostatConfig) -> Result<Self, ConfigError> {
        Self::restore(config, None)
    }

    /// Like [`new`](Self::new), seeded from previously published state.
    pub fn restore(
        config: ThermostatConfig,
        stored: Option<&ObservableState>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let ctx = ReconciliationContext::restore(&config, stored);
        let window = Arc::new(WindowMonitor::new(config.window_delay()));
        info!(
            "{}: reconciler created, target {} in [{}, {}]",
            config.name, ctx.current_target_temp, ctx.min_temp, ctx.max_temp
        );
        Ok(Self {
            config,
            ctx,
            queue: Arc::new(ControlQueue::new()),
            valve: Arc::new(ValveSlot::new()),
            window,
            stats: ReconcileStats::default(),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Leave start-up and queue the first control pass.
    pub fn finish_startup(&mut self) {
        if !self.ctx.startup_running {
            return;
        }
        self.ctx.startup_running = false;
        info!("{}: startup finished", self.config.name);
        self.request_control();
    }

    /// Suppress (or re-enable) device-driven updates.
    pub fn set_ignore_states(&mut self, ignore: bool) {
        if self.ctx.ignore_states != ignore {
            debug!("{}: ignore_states -> {}", self.config.name, ignore);
        }
        self.ctx.ignore_states = ignore;
    }

    // ── Device input ──────────────────────────────────────────

    /// Reconcile one device state-change event.
    pub fn handle_device_event(
        &mut self,
        event: &RawDeviceEvent,
        publisher: &mut impl StatePublisher,
    ) -> Outcome {
        self.stats.events += 1;

        let admission = match admit(&self.ctx, &self.config, event) {
            Ok(a) => a,
            Err(r) => {
                self.stats.rejected += 1;
                return Outcome::Rejected(r);
            }
        };

        let target = match admission.setpoint {
            Ok(raw) => {
                let clamped = clamp_setpoint(raw, self.ctx.min_temp, self.ctx.max_temp);
                if clamped.bound.is_some() {
                    self.stats.clamped += 1;
                }
                Some(clamped.value)
            }
            Err(r) => {
                debug!("{}: setpoint not synced, {}", self.config.name, r);
                None
            }
        };

        let changes = detect_change(&self.ctx, Some(admission.mode), target);
        if let Some((from, to)) = changes.mode {
            debug!(
                "{}: device mode changed from {:?} to {:?}",
                self.config.name, from, to
            );
        }

        if self.commit(&changes, publisher) {
            self.stats.updated += 1;
            return Outcome::Updated(changes);
        }

        match admission.setpoint {
            Err(r) => {
                self.stats.rejected += 1;
                Outcome::Rejected(r)
            }
            Ok(_) => {
                self.stats.unchanged += 1;
                Outcome::Unchanged
            }
        }
    }

    /// Feed a raw valve-position reading.  See [`ValveSlot::update`].
    pub fn update_valve_position(&self, position: Option<f32>) -> bool {
        self.valve.update(position)
    }

    // ── Operator input ────────────────────────────────────────

    /// Set the target temperature from the controller's own UI.
    ///
    /// Returns `true` if the stored target changed.
    pub fn set_target_temperature(
        &mut self,
        temperature: f32,
        publisher: &mut impl StatePublisher,
    ) -> bool {
        if temperature.is_nan() {
            warn!(
                "{}: ignoring non-numeric target temperature {}",
                self.config.name, temperature
            );
            return false;
        }
        let clamped = clamp_setpoint(temperature, self.ctx.min_temp, self.ctx.max_temp);
        let changes = detect_change(&self.ctx, None, Some(clamped.value));
        self.commit(&changes, publisher)
    }

    /// Change the controller's own operating mode.
    ///
    /// Returns `true` if the mode changed.
    pub fn set_managed_mode(
        &mut self,
        mode: ManagedMode,
        publisher: &mut impl StatePublisher,
    ) -> bool {
        if self.ctx.managed_mode == mode {
            return false;
        }
        info!(
            "{}: managed mode {:?} -> {:?}",
            self.config.name, self.ctx.managed_mode, mode
        );
        self.ctx.managed_mode = mode;
        self.touch(publisher);
        true
    }

    // ── Sensor input ──────────────────────────────────────────

    /// Feed a room-temperature report from the external sensor.
    ///
    /// Every accepted reading is published and queues a control pass, even
    /// if the value did not change.
    pub fn update_temperature(&mut self, state: &str, publisher: &mut impl StatePublisher) -> bool {
        if self.ctx.startup_running {
            debug!(
                "{}: skipping temperature update, startup is running",
                self.config.name
            );
            return false;
        }
        if NO_READING.contains(&state) {
            debug!("{}: temperature sensor is {}, skipping", self.config.name, state);
            return false;
        }
        let Some(temperature) = state.trim().parse::<f32>().ok().filter(|t| !t.is_nan()) else {
            error!(
                "{}: unable to update temperature, '{}' is not a number",
                self.config.name, state
            );
            return false;
        };
        self.ctx.current_temperature = Some(temperature);
        self.stats.temperature_readings += 1;
        self.touch(publisher);
        true
    }

    /// Feed a raw window-sensor report.
    ///
    /// A report that differs from the committed state is proposed to the
    /// [`WindowMonitor`]; it takes effect through
    /// [`set_window_open`](Self::set_window_open) once confirmed.
    pub fn handle_window_event(&self, state: &str) -> bool {
        let Some(open) = self.window.observe(&self.config.name, state) else {
            return false;
        };
        if self.ctx.window_open == Some(open) {
            debug!(
                "{}: window state did not change, skipping event",
                self.config.name
            );
            return false;
        }
        self.window.propose(open);
        true
    }

    /// Commit a confirmed window state.
    pub fn set_window_open(&mut self, open: bool, publisher: &mut impl StatePublisher) -> bool {
        if self.ctx.window_open == Some(open) {
            return false;
        }
        info!("{}: window open -> {}", self.config.name, open);
        self.ctx.window_open = Some(open);
        self.touch(publisher);
        true
    }

    /// Night-mode switch.  Call once per minute with the wall-clock time.
    ///
    /// Returns `true` if night mode started or ended.
    pub fn on_clock_tick(&mut self, now: ClockTime, publisher: &mut impl StatePublisher) -> bool {
        let Some(night) = self.config.night else {
            return false;
        };
        if now == night.start {
            info!("{}: night mode activated", self.config.name);
            self.ctx.last_daytime_temp = Some(self.ctx.current_target_temp);
            self.ctx.current_target_temp =
                clamp_setpoint(night.temp, self.ctx.min_temp, self.ctx.max_temp).value;
            self.ctx.night_mode_active = true;
        } else if now == night.end {
            info!("{}: day mode activated", self.config.name);
            match self.ctx.last_daytime_temp {
                Some(t) => self.ctx.current_target_temp = t,
                None => error!(
                    "{}: could not load last daytime temperature, keeping the current target",
                    self.config.name
                ),
            }
            self.ctx.night_mode_active = false;
        } else {
            return false;
        }
        self.touch(publisher);
        true
    }

    /// Queue a control pass for the current generation.
    pub fn request_control(&self) {
        let superseded = self.queue.push(ControlRequest {
            generation: self.ctx.generation,
        });
        if superseded > 0 {
            debug!(
                "{}: control request coalesced ({} superseded)",
                self.config.name, superseded
            );
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn context(&self) -> &ReconciliationContext {
        &self.ctx
    }

    pub fn config(&self) -> &ThermostatConfig {
        &self.config
    }

    pub fn target_temperature(&self) -> f32 {
        self.ctx.current_target_temp
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// Consumer handle for the control pass.
    pub fn control_queue(&self) -> Arc<ControlQueue<ControlRequest>> {
        Arc::clone(&self.queue)
    }

    /// Shared handle for position feeds and waiters.
    pub fn valve_slot(&self) -> Arc<ValveSlot> {
        Arc::clone(&self.valve)
    }

    /// Consumer handle for window confirmations.
    pub fn window_monitor(&self) -> Arc<WindowMonitor> {
        Arc::clone(&self.window)
    }

    // ── Internal ──────────────────────────────────────────────

    /// New generation for a change outside the device path: publish, queue.
    fn touch(&mut self, publisher: &mut impl StatePublisher) {
        self.ctx.generation = self.ctx.generation.wrapping_add(1);
        publisher.publish(&self.ctx.observable());
        self.request_control();
    }

    /// Apply, publish, then queue.  No-op for an empty change set.
    fn commit(&mut self, changes: &ChangeSet, publisher: &mut impl StatePublisher) -> bool {
        if !apply_change(&mut self.ctx, changes) {
            return false;
        }
        publisher.publish(&self.ctx.observable());
        self.request_control();
        true
    }
}
