//! Coalescing control-intent queue.
//!
//! Producers never wait and never lose the newest request.  The backing
//! channel is one slot deep; a push first drains whatever is pending (those
//! requests are superseded) and then stores the new one.  If another
//! producer refilled the slot in between, the drain is repeated, so once
//! producers quiesce exactly one item is queued.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

/// Single-pending-item queue with replace-with-latest semantics.
pub struct ControlQueue<T> {
    slot: Channel<CriticalSectionRawMutex, T, 1>,
    superseded: AtomicU32,
}

impl<T> ControlQueue<T> {
    pub const fn new() -> Self {
        Self {
            slot: Channel::new(),
            superseded: AtomicU32::new(0),
        }
    }

    /// Queue `item`, discarding anything still pending.
    ///
    /// Returns how many pending items were superseded by this push.
    pub fn push(&self, item: T) -> u32 {
        let mut item = item;
        let mut dropped = 0;
        loop {
            while self.slot.try_receive().is_ok() {
                dropped += 1;
            }
            match self.slot.try_send(item) {
                Ok(()) => break,
                Err(TrySendError::Full(back)) => item = back,
            }
        }
        if dropped > 0 {
            self.superseded.fetch_add(dropped, Ordering::Relaxed);
        }
        dropped
    }

    /// Take the pending item, if any, without waiting.
    pub fn try_next(&self) -> Option<T> {
        self.slot.try_receive().ok()
    }

    /// Wait for the next item.
    pub async fn next(&self) -> T {
        self.slot.receive().await
    }

    /// Number of queued items (0 or 1 once producers are idle).
    pub fn len(&self) -> usize {
        self.slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_empty()
    }

    /// Total requests discarded by coalescing since construction.
    pub fn superseded(&self) -> u32 {
        self.superseded.load(Ordering::Relaxed)
    }
}

impl<T> Default for ControlQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
