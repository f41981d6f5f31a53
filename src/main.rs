//! trvsync host simulator.
//!
//! Reads one JSON message per line from stdin and drives a [`Reconciler`]
//! with it, while a control-pass task on a local executor drains the
//! coalesced control queue.
//!
//! ```text
//! stdin (JSON lines) ──▶ Reconciler ──▶ LogStatePublisher
//!                            │
//!                            ├──▶ ControlQueue ──▶ control task (executor)
//!                            └──▶ WindowMonitor ─▶ window task (executor)
//! ```
//!
//! Message shapes:
//!
//! ```text
//! {"type":"device","old_state":{...},"new_state":{"state":"heat","attributes":{...}}}
//! {"type":"valve","position":42}
//! {"type":"target","temperature":21.5}
//! {"type":"mode","mode":"off"}
//! {"type":"temperature","state":"19.5"}
//! {"type":"window","state":"on"}
//! {"type":"clock","hour":22,"minute":0}
//! {"type":"startup_done"}
//! {"type":"maintenance"}
//! ```
//!
//! Usage: `trvsync-sim [config.json] < events.jsonl`.  `TRVSYNC_LOG` takes
//! an `EnvFilter` directive (default `info`).

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use embassy_time::{Duration, Timer};
use log::{info, warn};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use trvsync::adapters::log_sink::LogStatePublisher;
use trvsync::config::{ClockTime, ThermostatConfig};
use trvsync::device::RawDeviceEvent;
use trvsync::maintenance::exercise_valve;
use trvsync::reconcile::ports::{DriverError, ValveDriver};
use trvsync::reconcile::{ManagedMode, Reconciler};
use trvsync::sync::ValveSlot;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SimInput {
    Device(RawDeviceEvent),
    Valve { position: Option<f32> },
    Target { temperature: f32 },
    Mode { mode: ManagedMode },
    Temperature { state: String },
    Window { state: String },
    Clock { hour: u8, minute: u8 },
    StartupDone,
    Maintenance,
}

/// Simulated valve: every command is reported straight back as a reading.
struct EchoValve {
    slot: Arc<ValveSlot>,
}

impl ValveDriver for EchoValve {
    async fn set_valve_position(&mut self, percent: u8) -> Result<(), DriverError> {
        self.slot.update(Some(f32::from(percent)));
        Ok(())
    }
}

/// `log` records are bridged into the tracing subscriber.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env("TRVSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}

fn load_config() -> Result<ThermostatConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(ThermostatConfig::default());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    Ok(config)
}

fn apply(reconciler: &mut Reconciler, publisher: &mut LogStatePublisher, input: SimInput) {
    match input {
        SimInput::Device(event) => {
            let outcome = reconciler.handle_device_event(&event, publisher);
            info!("EVENT | {outcome:?}");
        }
        SimInput::Valve { position } => {
            reconciler.update_valve_position(position);
        }
        SimInput::Target { temperature } => {
            reconciler.set_target_temperature(temperature, publisher);
        }
        SimInput::Mode { mode } => {
            reconciler.set_managed_mode(mode, publisher);
        }
        SimInput::Temperature { state } => {
            reconciler.update_temperature(&state, publisher);
        }
        SimInput::Window { state } => {
            reconciler.handle_window_event(&state);
        }
        SimInput::Clock { hour, minute } => {
            reconciler.on_clock_tick(ClockTime::new(hour, minute), publisher);
        }
        SimInput::StartupDone => reconciler.finish_startup(),
        SimInput::Maintenance => {
            let mut valve = EchoValve {
                slot: reconciler.valve_slot(),
            };
            match futures_lite::future::block_on(exercise_valve(reconciler, &mut valve)) {
                Ok(report) => info!("MAINT | {} cycles", report.cycles_completed),
                Err(e) => warn!("MAINT | {e}"),
            }
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;

    let config = load_config()?;
    let window_delay = config.window_delay();
    let reconciler = Rc::new(RefCell::new(Reconciler::new(config)?));
    let queue = reconciler.borrow().control_queue();
    let window = reconciler.borrow().window_monitor();
    let mut publisher = LogStatePublisher::new();

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    let control = Rc::clone(&reconciler);
    executor
        .spawn(async move {
            loop {
                let request = queue.next().await;
                let r = control.borrow();
                let ctx = r.context();
                info!(
                    "CONTROL | request gen={} | live gen={} | device={:?} | managed={:?} | target={:.1}",
                    request.generation,
                    ctx.generation,
                    ctx.current_device_mode,
                    ctx.managed_mode,
                    ctx.current_target_temp,
                );
            }
        })
        .detach();

    let committer = Rc::clone(&reconciler);
    executor
        .spawn(async move {
            let mut publisher = LogStatePublisher::new();
            loop {
                if let Some(open) = window.next_confirmed().await {
                    committer.borrow_mut().set_window_open(open, &mut publisher);
                }
            }
        })
        .detach();

    for (lineno, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<SimInput>(line) {
            Ok(input) => apply(&mut reconciler.borrow_mut(), &mut publisher, input),
            Err(e) => warn!("line {}: {e}", lineno + 1),
        }
        while executor.try_tick() {}
    }

    // Let a window change still settling finish.
    futures_lite::future::block_on(
        executor.run(Timer::after(window_delay + Duration::from_millis(10))),
    );

    let stats = reconciler.borrow().stats();
    info!(
        "DONE | events={} updated={} unchanged={} rejected={} clamped={} temperature_readings={}",
        stats.events,
        stats.updated,
        stats.unchanged,
        stats.rejected,
        stats.clamped,
        stats.temperature_readings
    );
    Ok(())
}
