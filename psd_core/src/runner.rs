//! Fixed-rate control loop: source → decode → plan → synthesize → sink.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use psd_traits::{Clock, CommandSink, SignalSource};

use crate::error::{PsdError, Result};
use crate::interface::{Planner, VehicleInterface};

/// Loop pacing and stop conditions.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Tick period.
    pub period: Duration,
    /// Checked between ticks; the loop exits cleanly once it is set.
    pub shutdown: Option<Arc<AtomicBool>>,
    /// Stop after this many ticks even if the source has more.
    pub max_ticks: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            period: crate::util::period(100),
            shutdown: None,
            max_ticks: None,
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub commands: u64,
    /// Ticks whose work took longer than the period.
    pub missed_deadlines: u64,
}

/// Drive `iface` until the source is exhausted, `max_ticks` is reached or
/// shutdown is requested.
///
/// The clock is read once at the top of every tick and the elapsed session
/// time is handed to both decode and synthesis, so every control law in a
/// tick sees the same `now`.
pub fn run<V, S, K, P, C>(
    iface: &mut V,
    source: &mut S,
    sink: &mut K,
    planner: &mut P,
    clock: &C,
    params: &RunParams,
) -> Result<RunStats>
where
    V: VehicleInterface,
    S: SignalSource + ?Sized,
    K: CommandSink<V::Command> + ?Sized,
    P: Planner + ?Sized,
    C: Clock + ?Sized,
{
    let epoch = clock.now();
    let mut stats = RunStats::default();
    tracing::info!(period_us = params.period.as_micros() as u64, "control loop start");

    loop {
        if params
            .shutdown
            .as_ref()
            .is_some_and(|s| s.load(Ordering::Relaxed))
        {
            tracing::info!(ticks = stats.ticks, "shutdown requested");
            break;
        }
        if params.max_ticks.is_some_and(|max| stats.ticks >= max) {
            break;
        }

        let tick_start = clock.now();
        let now = tick_start.saturating_duration_since(epoch);

        let frame = match source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "signal source failed");
                return Err(eyre::Report::new(PsdError::Source(e.to_string())));
            }
        };

        let state = iface
            .decode(&frame, now)
            .wrap_err_with(|| format!("decode failed at tick {}", stats.ticks))?;
        let request = planner.plan(&frame, &state);
        let synthesis = iface.synthesize(&state, &request, now);

        if let Err(e) = sink.send(&synthesis.commands) {
            tracing::warn!(error = %e, "command sink failed");
            return Err(eyre::Report::new(PsdError::Sink(e.to_string())));
        }

        stats.ticks += 1;
        stats.commands += synthesis.commands.len() as u64;

        let spent = clock.elapsed_since(tick_start);
        if spent >= params.period {
            stats.missed_deadlines += 1;
            tracing::warn!(
                tick = stats.ticks,
                spent_us = spent.as_micros() as u64,
                "tick overran its period"
            );
        } else {
            clock.sleep(params.period - spent);
        }
    }

    tracing::info!(
        ticks = stats.ticks,
        commands = stats.commands,
        missed = stats.missed_deadlines,
        "control loop done"
    );
    Ok(stats)
}
