//! Log-based state publisher.
//!
//! [`LogStatePublisher`] implements [`StatePublisher`] by writing each
//! published state to the log.

use log::info;

use crate::reconcile::ObservableState;
use crate::reconcile::ports::StatePublisher;

/// Adapter that logs every published state.
pub struct LogStatePublisher;

impl LogStatePublisher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogStatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher for LogStatePublisher {
    fn publish(&mut self, state: &ObservableState) {
        info!(
            "STATE | gen={} | device={:?} | managed={:?} | target={:.1}\u{00b0}C | room={:?} | window_open={:?} | night={}",
            state.generation,
            state.device_mode,
            state.managed_mode,
            state.target_temp,
            state.current_temperature,
            state.window_open,
            state.night_mode_active,
        );
    }
}
