//! Restart behaviour: state published to a store seeds the next start-up.

use trvsync::adapters::state_store::MemoryStateStore;
use trvsync::config::ThermostatConfig;
use trvsync::device::CanonicalMode;
use trvsync::reconcile::{ManagedMode, Reconciler};

use super::mock_ports::{device_event, running};

#[test]
fn restart_restores_published_state() {
    let mut store = MemoryStateStore::new();
    let mut first = running(ThermostatConfig::default());
    first.handle_device_event(&device_event("heat", 23.0), &mut store);
    first.set_managed_mode(ManagedMode::Off, &mut store);
    assert_eq!(store.writes(), 2);

    let second =
        Reconciler::restore(ThermostatConfig::default(), store.load().as_ref()).unwrap();
    let ctx = second.context();
    assert!(ctx.startup_running);
    assert_eq!(ctx.current_target_temp, 23.0);
    assert_eq!(ctx.managed_mode, ManagedMode::Off);
    assert_eq!(ctx.current_device_mode, CanonicalMode::Heat);
    assert_eq!(ctx.generation, first.context().generation);
}

#[test]
fn restart_with_narrower_bounds_clamps() {
    let mut store = MemoryStateStore::new();
    let mut first = running(ThermostatConfig::default());
    first.handle_device_event(&device_event("heat", 28.0), &mut store);

    let narrow = ThermostatConfig {
        min_temp: 10.0,
        max_temp: 24.0,
        ..Default::default()
    };
    let second = Reconciler::restore(narrow, store.load().as_ref()).unwrap();
    assert_eq!(second.target_temperature(), 24.0);
    assert!(second.context().target_in_bounds());
}

#[test]
fn restart_with_corrupt_store_uses_defaults() {
    let mut store = MemoryStateStore::new();
    store.set_raw(vec![0xde, 0xad]);
    let r = Reconciler::restore(ThermostatConfig::default(), store.load().as_ref()).unwrap();
    assert_eq!(r.target_temperature(), 5.0);
    assert_eq!(r.context().generation, 0);
}
