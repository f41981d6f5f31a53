//! Room temperature and window inputs feeding the control queue.

use futures_lite::future::block_on;

use trvsync::config::ThermostatConfig;
use trvsync::reconcile::Reconciler;

use super::mock_ports::{RecordingPublisher, running};

fn with_window_delay(ms: u64) -> Reconciler {
    running(ThermostatConfig {
        window_delay_ms: ms,
        ..Default::default()
    })
}

/// Run one confirmation round and commit the result, as the host task does.
fn settle_window(r: &mut Reconciler, p: &mut RecordingPublisher) -> Option<bool> {
    let monitor = r.window_monitor();
    let confirmed = block_on(monitor.next_confirmed());
    if let Some(open) = confirmed {
        r.set_window_open(open, p);
    }
    confirmed
}

// ── Temperature ───────────────────────────────────────────────

#[test]
fn temperature_reading_publishes_and_queues() {
    let mut r = running(ThermostatConfig::default());
    let mut p = RecordingPublisher::new();

    assert!(r.update_temperature("19.75", &mut p));
    assert_eq!(p.last().and_then(|s| s.current_temperature), Some(19.75));
    let req = r.control_queue().try_next().unwrap();
    assert_eq!(req.generation, r.context().generation);
}

#[test]
fn unusable_temperature_readings_are_dropped() {
    let mut r = running(ThermostatConfig::default());
    let mut p = RecordingPublisher::new();
    r.update_temperature("20", &mut p);
    r.control_queue().try_next();
    let before = r.context().clone();

    for state in ["unavailable", "unknown", "", "NaN", "twenty"] {
        assert!(!r.update_temperature(state, &mut p), "{state:?}");
    }
    assert_eq!(r.context(), &before);
    assert_eq!(p.published.len(), 1);
    assert!(r.control_queue().is_empty());
}

#[test]
fn temperature_ignored_during_startup() {
    let mut r = Reconciler::new(ThermostatConfig::default()).unwrap();
    let mut p = RecordingPublisher::new();
    assert!(!r.update_temperature("21", &mut p));
    assert_eq!(r.context().current_temperature, None);
    assert!(r.control_queue().is_empty());
}

#[test]
fn temperature_and_setpoint_bursts_share_one_request() {
    let mut r = running(ThermostatConfig::default());
    let mut p = RecordingPublisher::new();
    r.update_temperature("18", &mut p);
    r.set_target_temperature(22.0, &mut p);
    r.update_temperature("18.5", &mut p);

    let q = r.control_queue();
    assert_eq!(q.len(), 1);
    assert_eq!(q.try_next().unwrap().generation, r.context().generation);
}

// ── Window ────────────────────────────────────────────────────

#[test]
fn window_open_commits_after_delay() {
    let mut r = with_window_delay(10);
    let mut p = RecordingPublisher::new();

    assert!(r.handle_window_event("on"));
    // Nothing changes until the monitor confirms.
    assert_eq!(r.context().window_open, None);
    assert!(r.control_queue().is_empty());

    assert_eq!(settle_window(&mut r, &mut p), Some(true));
    assert_eq!(r.context().window_open, Some(true));
    assert_eq!(p.last().and_then(|s| s.window_open), Some(true));
    assert_eq!(r.control_queue().len(), 1);
}

#[test]
fn window_bounce_collapses_to_latest() {
    let mut r = with_window_delay(5);
    let mut p = RecordingPublisher::new();

    for state in ["on", "off", "on", "off", "on"] {
        r.handle_window_event(state);
    }
    assert_eq!(settle_window(&mut r, &mut p), Some(true));
    assert!(!r.window_monitor().has_pending());
    assert_eq!(p.published.len(), 1);
}

#[test]
fn window_flip_back_is_not_committed() {
    let mut r = with_window_delay(0);
    let mut p = RecordingPublisher::new();
    r.handle_window_event("off");
    settle_window(&mut r, &mut p);
    r.control_queue().try_next();

    r.handle_window_event("on");
    // The sensor returns to "off" before the proposal is confirmed, and
    // "off" matches the committed state so nothing new is proposed.
    assert!(!r.handle_window_event("off"));
    assert_eq!(settle_window(&mut r, &mut p), None);
    assert_eq!(r.context().window_open, Some(false));
    assert!(r.control_queue().is_empty());
}

#[test]
fn unknown_counts_as_open_and_garbage_is_dropped() {
    let mut r = with_window_delay(0);
    let mut p = RecordingPublisher::new();

    assert!(!r.handle_window_event("ajar"));
    assert!(!r.window_monitor().has_pending());

    assert!(r.handle_window_event("unknown"));
    assert_eq!(settle_window(&mut r, &mut p), Some(true));

    // Same as committed: skipped.
    assert!(!r.handle_window_event("on"));
}
