//! Thermostat configuration parameters
//!
//! All tunable parameters for one reconciled thermostat.  The core only
//! reads these; loading and persisting them belongs to the host.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Attribute key the device uses for its own heating setpoint.
pub const DEFAULT_SETPOINT_ATTRIBUTE: &str = "current_heating_setpoint";

/// Source of truth for the setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CalibrationMode {
    /// The device setpoint is the user's setpoint; read it back verbatim.
    DirectRead = 0,
    /// The controller writes a compensated setpoint to the device, so the
    /// device-reported value is derived and must not be read back.
    TargetOverride = 1,
}

/// Per-model device behaviour that the translator has to undo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceQuirks {
    /// Device reports `auto` where it means `heat`.
    pub heat_auto_swapped: bool,
}

/// Valve exercise cycle parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePlan {
    /// Number of close/open cycles.
    pub cycles: u8,
    /// How many times a move command is re-sent before giving up.
    pub max_retries: u8,
    /// Pause after each completed move, protects the valve motor.
    pub rest_ms: u64,
    /// Upper bound on waiting for one fresh position reading.
    pub reading_timeout_ms: u64,
}

impl MaintenancePlan {
    pub fn rest(&self) -> Duration {
        Duration::from_millis(self.rest_ms)
    }

    pub fn reading_timeout(&self) -> Duration {
        Duration::from_millis(self.reading_timeout_ms)
    }
}

impl Default for MaintenancePlan {
    fn default() -> Self {
        Self {
            cycles: 4,
            max_retries: 3,
            rest_ms: 60_000,
            reading_timeout_ms: 120_000,
        }
    }
}

/// Wall-clock time of day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }
}

/// Night setback: between `start` and `end` the target drops to `temp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightSchedule {
    pub temp: f32,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Core thermostat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermostatConfig {
    /// Name used as the log prefix.
    pub name: heapless::String<32>,

    // --- Bounds ---
    /// Lowest setpoint the thermostat accepts (Celsius)
    pub min_temp: f32,
    /// Highest setpoint the thermostat accepts (Celsius)
    pub max_temp: f32,

    // --- Device ---
    pub calibration_mode: CalibrationMode,
    pub quirks: DeviceQuirks,
    /// Attribute key carrying the device setpoint
    pub setpoint_attribute: heapless::String<32>,

    // --- Maintenance ---
    pub maintenance: MaintenancePlan,

    // --- Window / night ---
    /// How long a window state change must persist before it is committed.
    #[serde(default)]
    pub window_delay_ms: u64,
    #[serde(default)]
    pub night: Option<NightSchedule>,
}

impl ThermostatConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_temp.is_finite() || !self.max_temp.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "min_temp and max_temp must be finite",
            ));
        }
        if self.min_temp >= self.max_temp {
            return Err(ConfigError::ValidationFailed(
                "min_temp must be below max_temp",
            ));
        }
        if self.setpoint_attribute.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "setpoint_attribute must not be empty",
            ));
        }
        if self.maintenance.reading_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "maintenance.reading_timeout_ms must be non-zero",
            ));
        }
        if let Some(night) = &self.night {
            if !night.temp.is_finite() {
                return Err(ConfigError::ValidationFailed(
                    "night.temp must be finite",
                ));
            }
            if !night.start.is_valid() || !night.end.is_valid() {
                return Err(ConfigError::ValidationFailed(
                    "night.start and night.end must be valid times of day",
                ));
            }
            if night.start == night.end {
                return Err(ConfigError::ValidationFailed(
                    "night.start and night.end must differ",
                ));
            }
        }
        Ok(())
    }

    pub fn window_delay(&self) -> Duration {
        Duration::from_millis(self.window_delay_ms)
    }
}

fn short_string(s: &str) -> heapless::String<32> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            name: short_string("thermostat"),
            min_temp: 5.0,
            max_temp: 30.0,
            calibration_mode: CalibrationMode::DirectRead,
            quirks: DeviceQuirks::default(),
            setpoint_attribute: short_string(DEFAULT_SETPOINT_ATTRIBUTE),
            maintenance: MaintenancePlan::default(),
            window_delay_ms: 0,
            night: None,
        }
    }
}
