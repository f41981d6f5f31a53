//! Reconciliation core: pure domain logic, no I/O.
//!
//! Takes device state-change events, decides which of them may touch the
//! thermostat's state, and turns genuine changes into a published state
//! plus one coalesced control request.  All interaction with the host goes
//! through the port traits in [`ports`].

pub mod context;
pub mod gate;
pub mod ports;
pub mod service;
pub mod setpoint;

pub use context::{ManagedMode, ObservableState, ReconciliationContext};
pub use gate::Rejection;
pub use service::{ControlRequest, Outcome, Reconciler};
