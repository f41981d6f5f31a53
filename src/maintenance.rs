//! Valve maintenance: periodically drive the valve fully closed and fully
//! open so it does not seize.
//!
//! Device-driven state updates are suppressed for the whole cycle, since
//! the device will report the forced positions and modes.  Each move waits
//! on the [`ValveSlot`] for the device to confirm the position; a move that
//! is not confirmed is re-sent up to `max_retries` times.  When the cycle
//! ends, successfully or not, updates are re-enabled and one control
//! request is queued so regular control resumes straight away.

use core::fmt;

use embassy_time::Timer;
use log::{debug, error, info, warn};

use crate::config::MaintenancePlan;
use crate::reconcile::Reconciler;
use crate::reconcile::ports::{DriverError, ValveDriver};
use crate::sync::ValveSlot;

pub const VALVE_CLOSED: u8 = 0;
pub const VALVE_OPEN: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceError {
    /// The valve never confirmed reaching `target` percent.
    RetryLimit { target: u8 },
    Driver(DriverError),
}

impl fmt::Display for MaintenanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryLimit { target } => {
                write!(f, "valve did not reach {target}% after all retries")
            }
            Self::Driver(e) => write!(f, "valve command failed: {e}"),
        }
    }
}

impl From<DriverError> for MaintenanceError {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub cycles_completed: u8,
}

/// Run the configured exercise cycle against `driver`.
pub async fn exercise_valve(
    reconciler: &mut Reconciler,
    driver: &mut impl ValveDriver,
) -> Result<MaintenanceReport, MaintenanceError> {
    let plan = reconciler.config().maintenance;
    let name = reconciler.config().name.clone();
    let slot = reconciler.valve_slot();

    info!("{name}: maintenance started");
    reconciler.set_ignore_states(true);

    let mut completed = 0;
    let mut result = Ok(());
    for _ in 0..plan.cycles {
        result = exercise_once(&slot, driver, &plan).await;
        if result.is_err() {
            break;
        }
        completed += 1;
    }

    reconciler.set_ignore_states(false);
    match result {
        Ok(()) => info!("{name}: maintenance completed ({completed} cycles)"),
        Err(e) => error!("{name}: maintenance was aborted prematurely: {e}"),
    }
    reconciler.request_control();

    result.map(|()| MaintenanceReport {
        cycles_completed: completed,
    })
}

async fn exercise_once(
    slot: &ValveSlot,
    driver: &mut impl ValveDriver,
    plan: &MaintenancePlan,
) -> Result<(), MaintenanceError> {
    move_valve(slot, driver, plan, VALVE_CLOSED).await?;
    move_valve(slot, driver, plan, VALVE_OPEN).await
}

fn at(position: Option<f32>, target: u8) -> bool {
    position.is_some_and(|p| p.round() == f32::from(target))
}

/// Command `target` and wait for the device to confirm it.
async fn move_valve(
    slot: &ValveSlot,
    driver: &mut impl ValveDriver,
    plan: &MaintenancePlan,
    target: u8,
) -> Result<(), MaintenanceError> {
    if at(slot.last_position(), target) {
        return Ok(());
    }

    for attempt in 0..=plan.max_retries {
        slot.discard_fresh();
        driver.set_valve_position(target).await?;

        // Drain readings until the target shows up or the device goes quiet.
        while let Ok(position) = slot.wait_fresh_timeout(plan.reading_timeout()).await {
            debug!("maintenance: valve reports {position}% (want {target}%)");
            if at(Some(position), target) {
                if plan.rest_ms > 0 {
                    Timer::after(plan.rest()).await;
                }
                return Ok(());
            }
        }
        warn!(
            "maintenance: valve did not reach {target}% (attempt {} of {})",
            attempt + 1,
            u16::from(plan.max_retries) + 1
        );
    }

    Err(MaintenanceError::RetryLimit { target })
}
