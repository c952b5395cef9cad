//! Closed-loop simulated car for `psd simulate`.
//!
//! The car cruises at 50 km/h, the driver taps set-minus to engage, and
//! after two seconds the planner asks for a stop. Brake records coming back
//! from the core decelerate the car until it is held at standstill.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use eyre::WrapErr;
use psd_core::decoder::sig;
use psd_core::error::Result;
use psd_core::interface::plan_keys;
use psd_core::mocks::baseline_signals;
use psd_core::runner::{RunParams, RunStats, run};
use psd_core::util::MS_TO_KPH;
use psd_core::{Command, FramePlanner, build_psd};
use psd_traits::{CommandSink, ManualClock, MonotonicClock, SignalFrame, SignalSource};

use crate::run::{JsonlSink, open_output, run_params};

const START_KPH: f64 = 50.0;
/// Driver holds set-minus over this window (seconds).
const ENGAGE_PRESS: std::ops::Range<f64> = 0.5..0.6;
const STOP_AFTER_S: f64 = 2.0;
const STOP_ACCEL: f64 = -1.5;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Point-mass car driven by the brake records it is sent.
#[derive(Debug)]
pub struct Plant {
    tick: u64,
    total_ticks: u64,
    dt: f64,
    speed_ms: f64,
    decel: f64,
    brake_scale: f64,
}

impl Plant {
    pub fn new(dt: f64, total_ticks: u64, brake_scale: f64) -> Self {
        Self {
            tick: 0,
            total_ticks,
            dt,
            speed_ms: START_KPH / MS_TO_KPH,
            decel: 0.0,
            brake_scale,
        }
    }

    pub fn speed_kph(&self) -> f64 {
        self.speed_ms * MS_TO_KPH
    }

    fn next_frame(&mut self) -> Option<SignalFrame> {
        if self.tick >= self.total_ticks {
            return None;
        }
        let t = self.tick as f64 * self.dt;
        self.speed_ms = (self.speed_ms - self.decel * self.dt).max(0.0);
        let kph = self.speed_kph();

        let mut f = baseline_signals();
        f.insert(sig::WHEEL_SPEED.to_string(), kph);
        f.insert(sig::UI_SPEED.to_string(), kph);
        let pressing = ENGAGE_PRESS.contains(&t);
        f.insert(sig::SET_MINUS.to_string(), if pressing { 1.0 } else { 0.0 });
        f.insert(plan_keys::TORQUE.to_string(), 0.1 * (t * 0.5).sin());
        if t >= STOP_AFTER_S {
            f.insert(plan_keys::ACCEL.to_string(), STOP_ACCEL);
        }
        self.tick += 1;
        Some(f)
    }

    fn apply(&mut self, commands: &[Command]) {
        for c in commands {
            if let Command::AccBrake {
                brake_magnitude, ..
            } = c
            {
                self.decel = brake_magnitude * self.brake_scale;
            }
        }
    }
}

pub struct SimSource(Arc<Mutex<Plant>>);

impl SignalSource for SimSource {
    fn read(&mut self) -> std::result::Result<Option<SignalFrame>, BoxError> {
        let mut plant = self.0.lock().map_err(|_| "simulated plant poisoned")?;
        Ok(plant.next_frame())
    }
}

/// Feeds commands back into the plant, then on to the JSONL output.
pub struct SimSink<W: Write> {
    plant: Arc<Mutex<Plant>>,
    out: JsonlSink<W>,
}

impl<W: Write> CommandSink<Command> for SimSink<W> {
    fn send(&mut self, commands: &[Command]) -> std::result::Result<(), BoxError> {
        self.plant
            .lock()
            .map_err(|_| "simulated plant poisoned")?
            .apply(commands);
        self.out.send(commands)
    }
}

pub fn run_simulate(
    cfg: &psd_config::Config,
    seconds: f64,
    realtime: bool,
    out: Option<&std::path::Path>,
) -> Result<RunStats> {
    if !(seconds.is_finite() && seconds > 0.0) {
        eyre::bail!("--seconds must be a positive number");
    }
    let params = run_params(cfg);
    let dt = params.period.as_secs_f64();
    let total_ticks = (seconds / dt).round() as u64;
    let plant = Arc::new(Mutex::new(Plant::new(dt, total_ticks, cfg.brake.scale)));

    let mut psd = build_psd(cfg)?;
    let mut source = SimSource(Arc::clone(&plant));
    let mut sink = SimSink {
        plant: Arc::clone(&plant),
        out: JsonlSink::new(open_output(out)?),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    if realtime {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }
    let params = RunParams {
        shutdown: Some(shutdown),
        ..params
    };
    tracing::info!(seconds, realtime, ticks = total_ticks, "simulation start");

    let stats = if realtime {
        run(&mut psd, &mut source, &mut sink, &mut FramePlanner, &MonotonicClock::new(), &params)?
    } else {
        run(&mut psd, &mut source, &mut sink, &mut FramePlanner, &ManualClock::new(), &params)?
    };
    sink.out.finish().wrap_err("flush command output")?;

    if let Ok(p) = plant.lock() {
        tracing::info!(
            speed_kph = p.speed_kph(),
            cruise_engaged = psd.cruise().engaged(),
            standstill = ?psd.brake().state(),
            "simulation done"
        );
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_stops_when_braked_and_ends_on_schedule() {
        let mut plant = Plant::new(0.01, 3, 1.4);
        plant.apply(&[Command::AccBrake {
            long_active: true,
            brake_request: true,
            pump: 0.6,
            brake_magnitude: 1000.0,
            aeb: false,
        }]);
        let f = plant.next_frame().unwrap();
        assert_eq!(f[sig::WHEEL_SPEED], 0.0);
        assert!(plant.next_frame().is_some());
        assert!(plant.next_frame().is_some());
        assert!(plant.next_frame().is_none());
    }
}
