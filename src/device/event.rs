//! Raw device-state notifications.
//!
//! Mirrors the shape of a host state-change event: an optional old and an
//! optional new snapshot, each with an optional attribute map.  Nothing here
//! is validated; that is the gate's job.

use serde::{Deserialize, Serialize};

/// Free-form attribute map reported by the device.
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;

/// One reported device state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Operating-mode string as the device reports it (`heat`, `off`, ...).
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
}

impl DeviceSnapshot {
    /// Snapshot with a mode and the given attributes.
    pub fn new(state: &str, attributes: AttributeMap) -> Self {
        Self {
            state: Some(state.to_owned()),
            attributes: Some(attributes),
        }
    }

    /// Convenience: snapshot with a mode and a single numeric attribute.
    pub fn with_setpoint(state: &str, key: &str, setpoint: f32) -> Self {
        let mut attributes = AttributeMap::new();
        attributes.insert(key.to_owned(), serde_json::Value::from(f64::from(setpoint)));
        Self::new(state, attributes)
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.as_ref().and_then(|a| a.get(key))
    }
}

/// A state-change notification for the valve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeviceEvent {
    #[serde(default)]
    pub old_state: Option<DeviceSnapshot>,
    #[serde(default)]
    pub new_state: Option<DeviceSnapshot>,
}

impl RawDeviceEvent {
    pub fn new(old_state: DeviceSnapshot, new_state: DeviceSnapshot) -> Self {
        Self {
            old_state: Some(old_state),
            new_state: Some(new_state),
        }
    }

    /// Both snapshots present and the new one carries attributes.
    pub fn is_complete(&self) -> bool {
        matches!(
            (&self.old_state, &self.new_state),
            (Some(_), Some(new)) if new.attributes.is_some()
        )
    }
}
