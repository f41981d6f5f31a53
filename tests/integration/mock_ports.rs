//! Mock port adapters for integration tests.
//!
//! Records every publish and every valve command so tests can assert on
//! the full history without a host or a device.

use std::collections::VecDeque;
use std::sync::Arc;

use trvsync::config::{DEFAULT_SETPOINT_ATTRIBUTE, ThermostatConfig};
use trvsync::device::{AttributeMap, DeviceSnapshot, RawDeviceEvent};
use trvsync::reconcile::ObservableState;
use trvsync::reconcile::ports::{DriverError, StatePublisher, ValveDriver};
use trvsync::reconcile::Reconciler;
use trvsync::sync::ValveSlot;

// ── RecordingPublisher ────────────────────────────────────────

#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Vec<ObservableState>,
}

#[allow(dead_code)]
impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ObservableState> {
        self.published.last()
    }
}

impl StatePublisher for RecordingPublisher {
    fn publish(&mut self, state: &ObservableState) {
        self.published.push(*state);
    }
}

// ── ScriptedValve ─────────────────────────────────────────────

/// What the simulated device reports after one command.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Report one reading (`None` models a report without a position).
    Report(Option<f32>),
    /// Report nothing.
    Silent,
    /// Refuse the command.
    Fail(DriverError),
}

/// Valve driver that answers each command from a script.  Once the script
/// runs out it echoes the commanded position.
pub struct ScriptedValve {
    slot: Arc<ValveSlot>,
    script: VecDeque<Reply>,
    pub commands: Vec<u8>,
}

#[allow(dead_code)]
impl ScriptedValve {
    pub fn echo(slot: Arc<ValveSlot>) -> Self {
        Self::scripted(slot, Vec::new())
    }

    pub fn scripted(slot: Arc<ValveSlot>, script: Vec<Reply>) -> Self {
        Self {
            slot,
            script: script.into(),
            commands: Vec::new(),
        }
    }
}

impl ValveDriver for ScriptedValve {
    async fn set_valve_position(&mut self, percent: u8) -> Result<(), DriverError> {
        self.commands.push(percent);
        match self.script.pop_front() {
            None => {
                self.slot.update(Some(f32::from(percent)));
            }
            Some(Reply::Report(reading)) => {
                self.slot.update(reading);
            }
            Some(Reply::Silent) => {}
            Some(Reply::Fail(e)) => return Err(e),
        }
        Ok(())
    }
}

// ── Builders ──────────────────────────────────────────────────

#[allow(dead_code)]
pub fn device_event(mode: &str, setpoint: f32) -> RawDeviceEvent {
    let snap = DeviceSnapshot::with_setpoint(mode, DEFAULT_SETPOINT_ATTRIBUTE, setpoint);
    RawDeviceEvent::new(snap.clone(), snap)
}

#[allow(dead_code)]
pub fn device_event_without_setpoint(mode: &str) -> RawDeviceEvent {
    let snap = DeviceSnapshot::new(mode, AttributeMap::new());
    RawDeviceEvent::new(snap.clone(), snap)
}

/// Reconciler past start-up with an empty control queue.
#[allow(dead_code)]
pub fn running(config: ThermostatConfig) -> Reconciler {
    let mut r = Reconciler::new(config).unwrap();
    r.finish_startup();
    r.control_queue().try_next();
    r
}
