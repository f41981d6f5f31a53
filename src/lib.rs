//! trvsync library.
//!
//! Reconciles what a thermostatic radiator valve reports with what its
//! thermostat controller wants.  Device events pass an ordered guard chain,
//! setpoints are clamped into the configured bounds, and genuine changes are
//! published and coalesced into at most one pending control request.  A
//! separate single-slot gate hands fresh valve-position readings to waiters.
//! Room temperature, debounced window state and the night setback feed the
//! same control queue.

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod device;
pub mod maintenance;
pub mod reconcile;
pub mod sync;
pub mod window;

mod error;

pub use error::{ConfigError, Error, Result, TranslationError};
