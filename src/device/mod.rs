//! Device side of the boundary: raw state-change events as the host
//! delivers them, and the translator that turns them into canonical form.
//!
//! The translator is the only place that knows how a particular valve
//! encodes its mode and setpoint.

pub mod event;
pub mod translate;

pub use event::{AttributeMap, DeviceSnapshot, RawDeviceEvent};
pub use translate::{CanonicalDeviceState, CanonicalMode, translate};
