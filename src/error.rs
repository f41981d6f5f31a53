//! Unified error types for trvsync.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! edge of the crate (host binary, adapters) uniform.  Guard rejections in
//! the reconciler are not errors: they are expected filtering
//! and are reported through [`Rejection`](crate::reconcile::gate::Rejection).

use core::fmt;

use crate::maintenance::MaintenanceError;
use crate::reconcile::ports::DriverError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A raw device snapshot could not be converted to canonical form.
    Translation(TranslationError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// The valve exercise cycle aborted.
    Maintenance(MaintenanceError),
    /// A valve command could not be delivered.
    Driver(DriverError),
    /// A published state snapshot could not be encoded or decoded.
    StateCodec,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation(e) => write!(f, "translation: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Maintenance(e) => write!(f, "maintenance: {e}"),
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::StateCodec => write!(f, "state snapshot codec failed"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Translation errors
// ---------------------------------------------------------------------------

/// Reasons a raw snapshot cannot be turned into a canonical device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationError {
    /// No new snapshot was supplied.
    MissingState,
    /// The snapshot has no operating-mode string.
    MissingMode,
    /// The snapshot carries no attribute map.
    MissingAttributes,
    /// The setpoint attribute is present but not a finite number.
    NonNumericSetpoint,
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingState => write!(f, "snapshot missing"),
            Self::MissingMode => write!(f, "mode missing"),
            Self::MissingAttributes => write!(f, "attributes missing"),
            Self::NonNumericSetpoint => write!(f, "setpoint is not numeric"),
        }
    }
}

impl From<TranslationError> for Error {
    fn from(e: TranslationError) -> Self {
        Self::Translation(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MaintenanceError> for Error {
    fn from(e: MaintenanceError) -> Self {
        Self::Maintenance(e)
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

impl From<postcard::Error> for Error {
    fn from(_: postcard::Error) -> Self {
        Self::StateCodec
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
