//! Setpoint clamping and change detection.

use log::warn;

use super::context::ReconciliationContext;
use crate::device::CanonicalMode;

/// Which bound a clamped setpoint was pulled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    /// Always within `[min, max]`.
    pub value: f32,
    /// `None` when the candidate was already in range.
    pub bound: Option<Bound>,
}

/// Pull `candidate` into `[min, max]`.
///
/// An out-of-range value is untrusted device telemetry, so it is corrected
/// and logged rather than treated as an error.
pub fn clamp_setpoint(candidate: f32, min: f32, max: f32) -> Clamped {
    let bound = if candidate < min {
        Some(Bound::Min)
    } else if candidate > max {
        Some(Bound::Max)
    } else {
        None
    };
    let value = match bound {
        Some(Bound::Min) => min,
        Some(Bound::Max) => max,
        None => candidate,
    };
    if bound.is_some() {
        warn!("setpoint {candidate} outside of range [{min}, {max}], overwriting it with {value}");
    }
    Clamped { value, bound }
}

/// Fields that differ between the held state and a candidate.
///
/// Each entry is `(from, to)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChangeSet {
    pub mode: Option<(CanonicalMode, CanonicalMode)>,
    pub target_temp: Option<(f32, f32)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.target_temp.is_none()
    }
}

/// Compare candidates against the context.  Setpoints compare with exact
/// inequality.
pub fn detect_change(
    ctx: &ReconciliationContext,
    mode: Option<CanonicalMode>,
    target_temp: Option<f32>,
) -> ChangeSet {
    ChangeSet {
        mode: mode
            .filter(|m| *m != ctx.current_device_mode)
            .map(|m| (ctx.current_device_mode, m)),
        target_temp: target_temp
            .filter(|t| *t != ctx.current_target_temp)
            .map(|t| (ctx.current_target_temp, t)),
    }
}

/// Write `changes` into the context.  Returns `true` if anything changed.
pub fn apply_change(ctx: &mut ReconciliationContext, changes: &ChangeSet) -> bool {
    if changes.is_empty() {
        return false;
    }
    if let Some((_, mode)) = changes.mode {
        ctx.current_device_mode = mode;
    }
    if let Some((_, target)) = changes.target_temp {
        ctx.current_target_temp = target;
    }
    ctx.generation = ctx.generation.wrapping_add(1);
    true
}
