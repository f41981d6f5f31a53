//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements     | Connects to                  |
//! |----------------|----------------|------------------------------|
//! | `log_sink`     | StatePublisher | `log` output                 |
//! | `state_store`  | StatePublisher | in-memory postcard snapshot  |

pub mod log_sink;
pub mod state_store;
