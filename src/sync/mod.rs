//! Inter-task signalling primitives.
//!
//! Both primitives are built on `embassy-sync` and are `Sync`, so the
//! reconciler (producer) and the control pass or maintenance task
//! (consumer) can share them through an `Arc` without further locking.
//!
//! ```text
//! ┌──────────────┐  ControlRequest  ┌──────────────────┐
//! │  Reconciler  │─────────────────▶│  Control pass    │
//! │  (sync)      │   ControlQueue   │  (async)         │
//! └──────────────┘                  └──────────────────┘
//! ┌──────────────┐   Option<f32>    ┌──────────────────┐
//! │ Position feed│─────────────────▶│  Maintenance     │
//! │  (sync)      │    ValveSlot     │  (async waiter)  │
//! └──────────────┘                  └──────────────────┘
//! ```

pub mod control_queue;
pub mod valve;

pub use control_queue::ControlQueue;
pub use valve::{ValveSlot, ValveWaitTimeout};
