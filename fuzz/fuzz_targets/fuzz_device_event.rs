//! Fuzz target: `Reconciler::handle_device_event`
//!
//! Parses arbitrary bytes as a device event and drives it through a
//! running reconciler.  Whatever the payload, the stored target must stay
//! within the configured bounds and at most one control request may be
//! queued.
//!
//! cargo fuzz run fuzz_device_event

#![no_main]

use libfuzzer_sys::fuzz_target;
use trvsync::config::ThermostatConfig;
use trvsync::device::RawDeviceEvent;
use trvsync::reconcile::{ObservableState, Reconciler};
use trvsync::reconcile::ports::StatePublisher;

struct Discard;

impl StatePublisher for Discard {
    fn publish(&mut self, _: &ObservableState) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(event) = serde_json::from_slice::<RawDeviceEvent>(data) else {
        return;
    };
    let Ok(mut reconciler) = Reconciler::new(ThermostatConfig::default()) else {
        return;
    };
    reconciler.finish_startup();

    // Twice: the replay must not change anything.
    reconciler.handle_device_event(&event, &mut Discard);
    let after_first = reconciler.context().clone();
    reconciler.handle_device_event(&event, &mut Discard);

    assert_eq!(reconciler.context(), &after_first, "replayed event mutated state");
    assert!(reconciler.context().target_in_bounds());
    assert!(reconciler.control_queue().len() <= 1);
});
