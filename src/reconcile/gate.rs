//! Update gate: decides whether a device event may touch state at all.
//!
//! Guards run in a fixed order, cheapest and most certain first.  A
//! rejection stops the chain, is logged at debug, and leaves the context
//! untouched.
//!
//! | # | Guard          | Rejects when                                  |
//! |---|----------------|-----------------------------------------------|
//! | 1 | startup        | controller still initialising                 |
//! | 2 | completeness   | a snapshot or the new attribute map is missing|
//! | 3 | translation    | snapshot cannot be made canonical             |
//! | 4 | ignore-states  | device updates globally suppressed            |
//! | 5 | mode validity  | device mode is neither heat nor off           |
//! | 6 | calibration    | calibration mode is not direct-read           |
//! | 7 | managed mode   | controller is off (setpoint only)             |
//! | 8 | setpoint       | device reported no setpoint                   |
//!
//! Guard 7 does not reject the event as a whole: the device mode still
//! passes through so mode bookkeeping can happen.  Only the setpoint is
//! withheld, which [`Admission::setpoint`] reports.  Guard 8 only runs
//! when the setpoint is wanted and rejects the whole event.

use core::fmt;

use log::debug;

use super::context::{ManagedMode, ReconciliationContext};
use crate::config::{CalibrationMode, ThermostatConfig};
use crate::device::{CanonicalMode, RawDeviceEvent, translate};
use crate::error::TranslationError;

/// Why an event (or its setpoint) was not applied.  Expected filtering,
/// not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    StartupRunning,
    Incomplete,
    Untranslatable(TranslationError),
    IgnoringStates,
    InvalidMode,
    CalibrationMode(CalibrationMode),
    ManagedModeOff,
    MissingSetpoint,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartupRunning => write!(f, "startup is running"),
            Self::Incomplete => write!(f, "update did not contain all necessary data"),
            Self::Untranslatable(e) => write!(f, "remapping device state failed: {e}"),
            Self::IgnoringStates => write!(f, "ignore_states is set"),
            Self::InvalidMode => write!(f, "decoded device mode is not valid"),
            Self::CalibrationMode(m) => {
                write!(f, "calibration mode is {m:?}, device setpoint is not read back")
            }
            Self::ManagedModeOff => write!(f, "managed mode is off, setpoint not synced"),
            Self::MissingSetpoint => write!(f, "device reported no setpoint"),
        }
    }
}

/// An event that passed the guard chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admission {
    /// Device mode, always `Heat` or `Off`.
    pub mode: CanonicalMode,
    /// Raw (unclamped) setpoint, or why it is withheld.
    pub setpoint: Result<f32, Rejection>,
}

/// Run the guard chain against `event`.
pub fn admit(
    ctx: &ReconciliationContext,
    config: &ThermostatConfig,
    event: &RawDeviceEvent,
) -> Result<Admission, Rejection> {
    let reject = |r: Rejection| {
        debug!("{}: skipping device update, {}", config.name, r);
        r
    };

    if ctx.startup_running {
        return Err(reject(Rejection::StartupRunning));
    }

    if !event.is_complete() {
        return Err(reject(Rejection::Incomplete));
    }

    let canonical = translate(
        event.new_state.as_ref(),
        config.quirks,
        &config.setpoint_attribute,
    )
    .map_err(|e| reject(Rejection::Untranslatable(e)))?;

    if ctx.ignore_states {
        return Err(reject(Rejection::IgnoringStates));
    }

    if canonical.mode == CanonicalMode::Other {
        return Err(reject(Rejection::InvalidMode));
    }

    if ctx.calibration_mode != CalibrationMode::DirectRead {
        return Err(reject(Rejection::CalibrationMode(ctx.calibration_mode)));
    }

    let setpoint = if ctx.managed_mode == ManagedMode::Off {
        Err(Rejection::ManagedModeOff)
    } else {
        match canonical.setpoint {
            Some(sp) => Ok(sp),
            None => return Err(reject(Rejection::MissingSetpoint)),
        }
    };

    Ok(Admission {
        mode: canonical.mode,
        setpoint,
    })
}
