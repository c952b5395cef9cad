use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use psd_core::decoder::sig;
use psd_core::interface::plan_keys;
use psd_core::mocks::frame_with;
use psd_core::{FramePlanner, PeroduaPsd, Planner, VehicleInterface};
use psd_traits::SignalFrame;

// Cruising trace: slow speed wobble, steering request sweeping side to side
fn synth_frames(n: usize) -> Vec<SignalFrame> {
    (0..n)
        .map(|i| {
            let t = i as f64 / 100.0;
            let kph = 60.0 + 5.0 * (t / 4.0).sin();
            frame_with(&[
                (sig::WHEEL_SPEED, kph),
                (sig::UI_SPEED, kph),
                (plan_keys::LAT_ACTIVE, 1.0),
                (plan_keys::LONG_ACTIVE, 1.0),
                (plan_keys::TORQUE, (t * 2.0).sin() * 0.5),
                (plan_keys::ACCEL, (t / 3.0).cos() - 0.5),
            ])
        })
        .collect()
}

pub fn bench_tick(c: &mut Criterion) {
    let mut g = c.benchmark_group("tick");
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p psd_core --bench tick
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(Duration::from_millis(ms_u64));
    }

    let frames = synth_frames(1_000);
    let period = Duration::from_millis(10);

    g.bench_function("decode_plan_synthesize_1000", |b| {
        b.iter_batched(
            || PeroduaPsd::builder().build().ok(),
            |psd| {
                let Some(mut psd) = psd else { return };
                let mut planner = FramePlanner;
                let mut now = Duration::ZERO;
                for frame in &frames {
                    if let Ok(state) = psd.decode(black_box(frame), now) {
                        let request = planner.plan(frame, &state);
                        black_box(psd.synthesize(&state, &request, now));
                    }
                    now += period;
                }
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

criterion_group!(tick, bench_tick);
criterion_main!(tick);
