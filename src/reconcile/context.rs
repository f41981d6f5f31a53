//! Reconciliation context and its published snapshot.
//!
//! `ReconciliationContext` is the long-lived state the reconciler owns for
//! one thermostat.  The [`Reconciler`](super::service::Reconciler) is its
//! only writer; everything else gets a shared reference.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{CalibrationMode, ThermostatConfig};
use crate::device::CanonicalMode;
use crate::error::Result;

/// The controller's own intended operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedMode {
    Heat,
    Off,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationContext {
    // -- Lifecycle flags --
    /// Controller is still initialising; every device event is dropped.
    pub startup_running: bool,
    /// Device-driven updates are globally suppressed (e.g. during maintenance).
    pub ignore_states: bool,

    // -- Configuration (read-only here) --
    pub calibration_mode: CalibrationMode,
    pub managed_mode: ManagedMode,
    pub min_temp: f32,
    pub max_temp: f32,

    // -- Tracked state --
    /// Last accepted device mode.  `Other` until the device reports.
    pub current_device_mode: CanonicalMode,
    /// Always within `[min_temp, max_temp]`.
    pub current_target_temp: f32,
    /// Last room temperature from the external sensor.
    pub current_temperature: Option<f32>,
    /// Committed window state; `None` until a confirmed sensor report.
    pub window_open: Option<bool>,
    pub night_mode_active: bool,
    /// Target saved when night mode started, restored when it ends.
    pub last_daytime_temp: Option<f32>,
    /// Bumped on every accepted change; queued control requests carry it.
    pub generation: u64,
}

impl ReconciliationContext {
    /// Fresh context for a controller that is starting up.
    pub fn new(config: &ThermostatConfig) -> Self {
        Self {
            startup_running: true,
            ignore_states: false,
            calibration_mode: config.calibration_mode,
            managed_mode: ManagedMode::Heat,
            min_temp: config.min_temp,
            max_temp: config.max_temp,
            current_device_mode: CanonicalMode::Other,
            current_target_temp: config.min_temp,
            current_temperature: None,
            window_open: None,
            night_mode_active: false,
            last_daytime_temp: None,
            generation: 0,
        }
    }

    /// Context seeded from the last published state.
    ///
    /// A stored target outside the configured bounds is pulled back in;
    /// with nothing stored the target starts at `min_temp`.
    pub fn restore(config: &ThermostatConfig, stored: Option<&ObservableState>) -> Self {
        let mut ctx = Self::new(config);
        let Some(stored) = stored else {
            return ctx;
        };

        let mut target = stored.target_temp;
        if !target.is_finite() {
            warn!(
                "{}: stored target temperature {} is not a number, using {}",
                config.name, target, ctx.min_temp
            );
            target = ctx.min_temp;
        } else if target < ctx.min_temp {
            warn!(
                "{}: stored target temperature {} is below min_temp {}, using min_temp",
                config.name, target, ctx.min_temp
            );
            target = ctx.min_temp;
        } else if target > ctx.max_temp {
            warn!(
                "{}: stored target temperature {} is above max_temp {}, using max_temp",
                config.name, target, ctx.max_temp
            );
            target = ctx.max_temp;
        }

        ctx.current_target_temp = target;
        ctx.managed_mode = stored.managed_mode;
        ctx.current_device_mode = stored.device_mode;
        ctx.generation = stored.generation;
        ctx
    }

    pub fn target_in_bounds(&self) -> bool {
        (self.min_temp..=self.max_temp).contains(&self.current_target_temp)
    }

    /// Snapshot suitable for publishing to the host.
    pub fn observable(&self) -> ObservableState {
        ObservableState {
            device_mode: self.current_device_mode,
            managed_mode: self.managed_mode,
            target_temp: self.current_target_temp,
            current_temperature: self.current_temperature,
            window_open: self.window_open,
            night_mode_active: self.night_mode_active,
            generation: self.generation,
        }
    }
}

// ---------------------------------------------------------------------------
// Observable state
// ---------------------------------------------------------------------------

/// What the controller exposes (and may persist) after a change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservableState {
    pub device_mode: CanonicalMode,
    pub managed_mode: ManagedMode,
    pub target_temp: f32,
    pub current_temperature: Option<f32>,
    pub window_open: Option<bool>,
    pub night_mode_active: bool,
    pub generation: u64,
}

impl ObservableState {
    /// Compact binary encoding for a state store.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
