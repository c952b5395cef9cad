use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use psd_core::decoder::sig;
use psd_core::interface::plan_keys;
use psd_core::mocks::{FailingSource, RecordingSink, ScriptedSource, frame_with};
use psd_core::runner::{RunParams, run};
use psd_core::{Command, FramePlanner, PeroduaPsd, PsdError};
use psd_traits::{Clock, ManualClock, SignalFrame};

fn params() -> RunParams {
    RunParams {
        period: Duration::from_millis(10),
        ..RunParams::default()
    }
}

/// Parked car, planner asking for -2 m/s^2 with longitudinal control active.
fn hold_frames(n: usize) -> Vec<SignalFrame> {
    (0..n)
        .map(|_| {
            frame_with(&[
                (plan_keys::ACCEL, -2.0),
                (plan_keys::LONG_ACTIVE, 1.0),
                (plan_keys::LAT_ACTIVE, 0.0),
            ])
        })
        .collect()
}

fn brake_emissions(sink: &RecordingSink<Command>) -> Vec<(usize, u8, bool, f64)> {
    sink.batches
        .iter()
        .enumerate()
        .flat_map(|(tick, batch)| {
            batch.iter().filter_map(move |c| match c {
                Command::AccBrake {
                    pump,
                    brake_request,
                    brake_magnitude,
                    ..
                } => Some((tick, (pump * 10.0).round() as u8, *brake_request, *brake_magnitude)),
                _ => None,
            })
        })
        .collect()
}

#[test]
fn standstill_hold_cycles_the_pump() {
    let mut psd = PeroduaPsd::builder().build().unwrap();
    let mut source = ScriptedSource::new(hold_frames(400));
    let mut sink = RecordingSink::default();
    let clock = ManualClock::new();

    let stats = run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &clock,
        &params(),
    )
    .unwrap();
    assert_eq!(stats.ticks, 400);
    assert_eq!(stats.missed_deadlines, 0);
    assert_eq!(clock.offset(), Duration::from_secs(4));

    let emissions = brake_emissions(&sink);
    assert_eq!(emissions.len(), 80);

    // no pump step larger than a tenth, ever
    let mut last = 0u8;
    for (_, pump, _, _) in &emissions {
        assert!(pump.abs_diff(last) <= 1, "pump jumped {last} -> {pump}");
        last = *pump;
    }

    let at_tick = |tick: usize| {
        emissions
            .iter()
            .find(|e| e.0 == tick)
            .copied()
            .unwrap()
    };
    // 0.8 (low-speed cap) + 0.2 margin = 1.0 → pump 0.6, reached after six emissions
    assert_eq!(at_tick(0).1, 1);
    assert_eq!(at_tick(25).1, 6);
    assert!(at_tick(145).2);
    assert!((at_tick(145).3 - 1.0).abs() < 1e-9);

    // pump reset at 1.5 s for 0.1 s: brake request drops, pump bleeds down
    let reset = at_tick(150);
    assert!(!reset.2);
    assert_eq!(reset.3, 0.0);
    assert_eq!(reset.1, 5);
    assert_eq!(at_tick(155).1, 4);
    assert!(!at_tick(155).2);

    // hold resumes at 1.6 s and resets again 1.5 s later
    assert!(at_tick(160).2);
    assert_eq!(at_tick(160).1, 5);
    assert!(at_tick(305).2);
    assert!(!at_tick(310).2);
    assert!(at_tick(320).2);
}

#[test]
fn missing_signal_stops_the_loop_with_typed_error() {
    let mut psd = PeroduaPsd::builder().build().unwrap();
    let mut broken = frame_with(&[]);
    broken.remove(sig::WHEEL_SPEED);
    let mut source = ScriptedSource::new(vec![frame_with(&[]), broken, frame_with(&[])]);
    let mut sink = RecordingSink::default();

    let err = run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &ManualClock::new(),
        &params(),
    )
    .unwrap_err();
    assert!(format!("{err}").contains("decode failed at tick 1"));
    assert_eq!(
        err.downcast_ref::<PsdError>(),
        Some(&PsdError::MissingSignal(sig::WHEEL_SPEED.to_string()))
    );
    assert_eq!(sink.batches.len(), 1);
}

#[test]
fn source_failure_is_reported() {
    let mut psd = PeroduaPsd::builder().build().unwrap();
    let mut sink = RecordingSink::<Command>::default();
    let err = run(
        &mut psd,
        &mut FailingSource,
        &mut sink,
        &mut FramePlanner,
        &ManualClock::new(),
        &params(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PsdError>(),
        Some(PsdError::Source(msg)) if msg.contains("bus offline")
    ));
}

#[test]
fn shutdown_and_tick_cap_stop_the_loop() {
    let mut psd = PeroduaPsd::builder().build().unwrap();
    let mut source = ScriptedSource::new(hold_frames(50));
    let mut sink = RecordingSink::default();
    let p = RunParams {
        max_ticks: Some(7),
        ..params()
    };
    let stats = run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &ManualClock::new(),
        &p,
    )
    .unwrap();
    assert_eq!(stats.ticks, 7);
    assert_eq!(source.remaining(), 43);

    let p = RunParams {
        shutdown: Some(Arc::new(AtomicBool::new(true))),
        ..params()
    };
    let stats = run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &ManualClock::new(),
        &p,
    )
    .unwrap();
    assert_eq!(stats.ticks, 0);
}

#[test]
fn button_engage_then_brake_disengages() {
    let mut psd = PeroduaPsd::builder().build().unwrap();
    let moving = |extra: &[(&str, f64)]| {
        let mut pairs = vec![(sig::WHEEL_SPEED, 60.0), (sig::UI_SPEED, 60.0)];
        pairs.extend_from_slice(extra);
        frame_with(&pairs)
    };
    let frames = vec![
        moving(&[(sig::SET_MINUS, 1.0)]),
        moving(&[]),
        moving(&[]),
        moving(&[(sig::BRAKE_ENGAGED, 1.0)]),
    ];
    let mut source = ScriptedSource::new(frames);
    let mut sink = RecordingSink::default();
    run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &ManualClock::new(),
        &params(),
    )
    .unwrap();
    assert!(!psd.cruise().engaged());
    // set speed picked up from the cluster on engage
    assert!((psd.cruise().speed_kph() - 62.4).abs() < 1e-9);
}

/// Counts clock reads; time moves only on sleep.
struct CountingClock {
    inner: ManualClock,
    reads: Cell<u32>,
}

impl Clock for CountingClock {
    fn now(&self) -> std::time::Instant {
        self.reads.set(self.reads.get() + 1);
        self.inner.now()
    }

    fn sleep(&self, d: Duration) {
        self.inner.sleep(d);
    }
}

#[test]
fn clock_is_read_once_per_tick_for_session_time() {
    let mut psd = PeroduaPsd::builder().build().unwrap();
    let mut source = ScriptedSource::new(hold_frames(5));
    let mut sink = RecordingSink::default();
    let clock = CountingClock {
        inner: ManualClock::new(),
        reads: Cell::new(0),
    };
    let stats = run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &clock,
        &params(),
    )
    .unwrap();
    assert_eq!(stats.ticks, 5);
    // epoch; per tick one read at the top and one to pace the sleep; the
    // last top-of-loop read finds the source exhausted
    assert_eq!(clock.reads.get(), 1 + 2 * 5 + 1);
    assert_eq!(clock.inner.offset(), Duration::from_millis(50));
}
