//! State translator: raw snapshot -> canonical `{mode, setpoint}`.
//!
//! Vendor quirks live here and nowhere else.  The rest of the crate only
//! ever sees [`CanonicalDeviceState`].

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::DeviceSnapshot;
use crate::config::DeviceQuirks;
use crate::error::TranslationError;

/// Normalised operating mode reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalMode {
    Heat,
    Off,
    /// Anything the reconciler does not act on (`auto`, `cool`, garbage).
    Other,
}

impl CanonicalMode {
    /// Exact, case-sensitive match on the host's mode strings.
    fn parse(raw: &str, quirks: DeviceQuirks) -> Self {
        match raw {
            "heat" => Self::Heat,
            "off" => Self::Off,
            "auto" if quirks.heat_auto_swapped => Self::Heat,
            _ => Self::Other,
        }
    }
}

/// Device state after translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalDeviceState {
    pub mode: CanonicalMode,
    /// `None` when the device did not report a setpoint.
    pub setpoint: Option<f32>,
}

/// Translate a new-state snapshot.
///
/// A missing setpoint is not an error; a setpoint that is present but not
/// a number is.  Magnitudes beyond `f32` saturate to infinity and are left
/// for the clamp to pull into range.
pub fn translate(
    new_state: Option<&DeviceSnapshot>,
    quirks: DeviceQuirks,
    setpoint_attribute: &str,
) -> Result<CanonicalDeviceState, TranslationError> {
    let snapshot = new_state.ok_or(TranslationError::MissingState)?;
    let raw_mode = snapshot
        .state
        .as_deref()
        .ok_or(TranslationError::MissingMode)?;
    let attributes = snapshot
        .attributes
        .as_ref()
        .ok_or(TranslationError::MissingAttributes)?;

    let mode = CanonicalMode::parse(raw_mode, quirks);
    let setpoint = match attributes.get(setpoint_attribute) {
        None | Some(Value::Null) => None,
        Some(value) => Some(coerce_f32(value).ok_or_else(|| {
            debug!("could not convert {value} to a setpoint");
            TranslationError::NonNumericSetpoint
        })?),
    };

    Ok(CanonicalDeviceState { mode, setpoint })
}

/// Numbers and numeric strings become `f32`; everything else is rejected.
fn coerce_f32(value: &Value) -> Option<f32> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    // `as` saturates out-of-range magnitudes to +/-inf.
    (!v.is_nan()).then_some(v as f32)
}
