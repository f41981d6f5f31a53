//! Valve-position synchronizer.
//!
//! A single-slot "fresh reading available" gate.  The feed side stores the
//! position and raises the gate; a waiter consumes the gate and gets the
//! position that raised it.  Raising before anyone waits is kept, raising
//! an already raised gate just replaces the pending value, and a consumed
//! gate can be waited on again.  A `None` reading changes nothing.

use core::cell::Cell;
use core::fmt;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, with_timeout};
use log::debug;

/// No fresh reading arrived within the allowed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValveWaitTimeout;

impl fmt::Display for ValveWaitTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timed out waiting for a valve position reading")
    }
}

pub struct ValveSlot {
    last_position: Mutex<CriticalSectionRawMutex, Cell<Option<f32>>>,
    fresh: Signal<CriticalSectionRawMutex, f32>,
}

impl ValveSlot {
    pub const fn new() -> Self {
        Self {
            last_position: Mutex::new(Cell::new(None)),
            fresh: Signal::new(),
        }
    }

    /// Record a position reading from the device.
    ///
    /// Returns `true` if the reading was stored and the gate raised.
    pub fn update(&self, position: Option<f32>) -> bool {
        let Some(position) = position else {
            debug!("valve position is None, skipping");
            return false;
        };
        debug!("updating valve position to {position}");
        self.last_position.lock(|p| p.set(Some(position)));
        self.fresh.signal(position);
        true
    }

    /// Most recent position ever reported, fresh or not.
    pub fn last_position(&self) -> Option<f32> {
        self.last_position.lock(Cell::get)
    }

    /// A reading arrived that no waiter has consumed yet.
    pub fn has_fresh(&self) -> bool {
        self.fresh.signaled()
    }

    /// Consume the fresh reading without waiting.
    pub fn try_take_fresh(&self) -> Option<f32> {
        self.fresh.try_take()
    }

    /// Lower the gate so the next wait needs a new reading.
    /// `last_position` is untouched.
    pub fn discard_fresh(&self) {
        self.fresh.reset();
    }

    /// Wait until a fresh reading is available and consume it.
    pub async fn wait_fresh(&self) -> f32 {
        self.fresh.wait().await
    }

    /// [`wait_fresh`](Self::wait_fresh) bounded by `timeout`.
    pub async fn wait_fresh_timeout(&self, timeout: Duration) -> Result<f32, ValveWaitTimeout> {
        with_timeout(timeout, self.fresh.wait())
            .await
            .map_err(|_| ValveWaitTimeout)
    }
}

impl Default for ValveSlot {
    fn default() -> Self {
        Self::new()
    }
}
