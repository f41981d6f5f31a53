//! In-memory state store.
//!
//! Implements [`StatePublisher`] by keeping the postcard-encoded snapshot
//! of the last published state, the way a host would persist it across
//! restarts.  [`MemoryStateStore::load`] gives it back for
//! [`Reconciler::restore`](crate::reconcile::Reconciler::restore).

use log::warn;

use crate::reconcile::ObservableState;
use crate::reconcile::ports::StatePublisher;

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    blob: Option<Vec<u8>>,
    writes: u32,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the stored snapshot.  A corrupt blob reads as "nothing stored".
    pub fn load(&self) -> Option<ObservableState> {
        let blob = self.blob.as_deref()?;
        match ObservableState::from_bytes(blob) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("state store: discarding stored snapshot: {e}");
                None
            }
        }
    }

    /// Number of successful writes.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Overwrite the raw blob.
    pub fn set_raw(&mut self, blob: Vec<u8>) {
        self.blob = Some(blob);
    }
}

impl StatePublisher for MemoryStateStore {
    fn publish(&mut self, state: &ObservableState) {
        match state.to_bytes() {
            Ok(bytes) => {
                self.blob = Some(bytes);
                self.writes += 1;
            }
            Err(e) => warn!("state store: could not encode state: {e}"),
        }
    }
}
