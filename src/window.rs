//! Window detection.
//!
//! Window sensors bounce.  A reported change is only committed after it
//! has held for `window_delay`: proposals go through a coalescing queue, a
//! consumer sleeps the delay and then checks the live sensor reading before
//! handing the state to [`Reconciler::set_window_open`].
//!
//! ```text
//!  sensor "on"/"off" ─▶ observe ─▶ propose ─▶ ControlQueue<bool>
//!                          │                        │
//!                          ▼                        ▼
//!                    live reading ◀── compare ── next_confirmed (after delay)
//! ```
//!
//! [`Reconciler::set_window_open`]: crate::reconcile::Reconciler::set_window_open

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use log::{debug, error, info, warn};

use crate::sync::ControlQueue;

/// Map a sensor state string to "window open".
///
/// `unknown` counts as open; unrecognised strings map to `None`.
pub fn parse_window_state(state: &str) -> Option<bool> {
    match state {
        "on" => Some(true),
        "unknown" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

pub struct WindowMonitor {
    proposals: ControlQueue<bool>,
    sensor_open: Mutex<CriticalSectionRawMutex, Cell<Option<bool>>>,
    delay: Duration,
}

impl WindowMonitor {
    pub const fn new(delay: Duration) -> Self {
        Self {
            proposals: ControlQueue::new(),
            sensor_open: Mutex::new(Cell::new(None)),
            delay,
        }
    }

    /// Record a raw sensor report and decode it.
    ///
    /// The live reading is updated for every report; anything but `off`
    /// reads as open.  Returns the decoded state, or `None` for a state
    /// string the sensor should never send.
    pub fn observe(&self, name: &str, state: &str) -> Option<bool> {
        self.sensor_open.lock(|s| s.set(Some(state != "off")));
        let open = parse_window_state(state);
        match (state, open) {
            ("unknown", _) => {
                warn!("{name}: window sensor state is unknown, assuming window is open");
            }
            (_, None) => error!("{name}: window sensor state '{state}' not recognized"),
            _ => {}
        }
        open
    }

    /// Queue a state change for confirmation, replacing any pending one.
    pub fn propose(&self, open: bool) {
        self.proposals.push(open);
    }

    /// Live sensor reading, as of the last report.
    pub fn sensor_open(&self) -> Option<bool> {
        self.sensor_open.lock(Cell::get)
    }

    pub fn has_pending(&self) -> bool {
        !self.proposals.is_empty()
    }

    /// Wait for the next proposal, let it settle, and confirm it.
    ///
    /// Returns `None` if the sensor no longer agrees once the delay is over.
    pub async fn next_confirmed(&self) -> Option<bool> {
        let proposed = self.proposals.next().await;
        if self.delay.as_ticks() > 0 {
            Timer::after(self.delay).await;
        }
        let current = self.sensor_open();
        if current == Some(proposed) {
            info!("window change confirmed, open={proposed}");
            Some(proposed)
        } else {
            debug!("window change to open={proposed} not confirmed, sensor reads {current:?}");
            None
        }
    }
}
