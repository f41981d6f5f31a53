//! Port traits: the boundary between the reconciler and its host.
//!
//! ```text
//!   Host event bus ──▶ Reconciler ──▶ StatePublisher
//!                          │
//!   Maintenance task ──────┴────────▶ ValveDriver
//! ```
//!
//! Adapters implement these; the reconciler consumes them via generics so
//! tests can substitute recording mocks.

use core::fmt;

use super::context::ObservableState;

/// Publishes (and may persist) the controller's observable state.
///
/// Called once per accepted change, before the control request is queued.
pub trait StatePublisher {
    fn publish(&mut self, state: &ObservableState);
}

/// Commands the physical valve.  Used only by the maintenance cycle; the
/// regular control pass owns its own transport.
#[allow(async_fn_in_trait)]
pub trait ValveDriver {
    /// Move the valve to `percent` open (0 = closed, 100 = fully open).
    async fn set_valve_position(&mut self, percent: u8) -> Result<(), DriverError>;
}

/// Errors from [`ValveDriver`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The device did not acknowledge the command.
    NotAcknowledged,
    /// The transport to the device is down.
    Unavailable,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAcknowledged => write!(f, "command not acknowledged"),
            Self::Unavailable => write!(f, "device unavailable"),
        }
    }
}
