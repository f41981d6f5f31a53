//! Valve exercise cycle against scripted valve drivers.

use futures_lite::future::block_on;

use trvsync::config::{MaintenancePlan, ThermostatConfig};
use trvsync::maintenance::{MaintenanceError, VALVE_CLOSED, VALVE_OPEN, exercise_valve};
use trvsync::reconcile::Reconciler;
use trvsync::reconcile::ports::DriverError;

use super::mock_ports::{Reply, ScriptedValve, running};

fn quick(cycles: u8, max_retries: u8) -> Reconciler {
    running(ThermostatConfig {
        maintenance: MaintenancePlan {
            cycles,
            max_retries,
            rest_ms: 0,
            reading_timeout_ms: 20,
        },
        ..Default::default()
    })
}

#[test]
fn echo_valve_completes_every_cycle() {
    let mut r = quick(2, 3);
    let mut valve = ScriptedValve::echo(r.valve_slot());

    let report = block_on(exercise_valve(&mut r, &mut valve)).unwrap();

    assert_eq!(report.cycles_completed, 2);
    assert_eq!(
        valve.commands,
        [VALVE_CLOSED, VALVE_OPEN, VALVE_CLOSED, VALVE_OPEN]
    );
    assert!(!r.context().ignore_states);
    assert_eq!(r.control_queue().len(), 1);
}

#[test]
fn move_skipped_when_already_in_position() {
    let mut r = quick(2, 3);
    r.update_valve_position(Some(0.0));
    let mut valve = ScriptedValve::echo(r.valve_slot());

    block_on(exercise_valve(&mut r, &mut valve)).unwrap();

    assert_eq!(valve.commands, [VALVE_OPEN, VALVE_CLOSED, VALVE_OPEN]);
}

#[test]
fn wrong_reading_is_retried() {
    let mut r = quick(1, 3);
    let mut valve = ScriptedValve::scripted(r.valve_slot(), vec![Reply::Report(Some(40.0))]);

    let report = block_on(exercise_valve(&mut r, &mut valve)).unwrap();

    assert_eq!(report.cycles_completed, 1);
    assert_eq!(valve.commands, [VALVE_CLOSED, VALVE_CLOSED, VALVE_OPEN]);
}

#[test]
fn silent_valve_hits_retry_limit() {
    let mut r = quick(3, 2);
    let script = vec![Reply::Silent; 3];
    let mut valve = ScriptedValve::scripted(r.valve_slot(), script);

    let err = block_on(exercise_valve(&mut r, &mut valve)).unwrap_err();

    assert_eq!(
        err,
        MaintenanceError::RetryLimit {
            target: VALVE_CLOSED
        }
    );
    assert_eq!(valve.commands, [VALVE_CLOSED; 3]);
    assert!(!r.context().ignore_states);
    assert_eq!(r.control_queue().len(), 1);
}

#[test]
fn reading_without_position_does_not_confirm() {
    let mut r = quick(1, 0);
    let mut valve = ScriptedValve::scripted(r.valve_slot(), vec![Reply::Report(None)]);

    let err = block_on(exercise_valve(&mut r, &mut valve)).unwrap_err();
    assert_eq!(
        err,
        MaintenanceError::RetryLimit {
            target: VALVE_CLOSED
        }
    );
    assert_eq!(r.valve_slot().last_position(), None);
}

#[test]
fn driver_failure_aborts_and_restores() {
    let mut r = quick(2, 3);
    let script = vec![Reply::Report(Some(0.0)), Reply::Fail(DriverError::Unavailable)];
    let mut valve = ScriptedValve::scripted(r.valve_slot(), script);

    let err = block_on(exercise_valve(&mut r, &mut valve)).unwrap_err();

    assert_eq!(err, MaintenanceError::Driver(DriverError::Unavailable));
    assert_eq!(valve.commands, [VALVE_CLOSED, VALVE_OPEN]);
    assert!(!r.context().ignore_states);
    assert_eq!(r.control_queue().len(), 1);
}

#[test]
fn stale_reading_before_command_is_ignored() {
    let mut r = quick(1, 1);
    // A reading that arrived before the command must not count as confirmation.
    r.update_valve_position(Some(100.0));
    let mut valve = ScriptedValve::scripted(r.valve_slot(), vec![Reply::Silent, Reply::Silent]);

    let err = block_on(exercise_valve(&mut r, &mut valve)).unwrap_err();
    assert_eq!(
        err,
        MaintenanceError::RetryLimit {
            target: VALVE_CLOSED
        }
    );
    assert_eq!(valve.commands, [VALVE_CLOSED, VALVE_CLOSED]);
}
