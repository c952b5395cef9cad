//! Config loading, JSONL command output, trace replay and config checks.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use eyre::WrapErr;
use psd_core::error::{PsdError, Result};
use psd_core::runner::{RunParams, RunStats, run};
use psd_core::{Command, FramePlanner, build_psd};
use psd_traits::{CommandSink, ManualClock};

use crate::cli::JSON_MODE;

fn config_error(msg: String) -> eyre::Report {
    eyre::Report::new(PsdError::Config(msg))
}

/// Read, parse and validate the config file; defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<psd_config::Config> {
    let Some(path) = path else {
        return Ok(psd_config::Config::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| config_error(format!("read {}: {e}", path.display())))?;
    let cfg = psd_config::load_toml(&text)
        .map_err(|e| config_error(format!("parse {}: {e}", path.display())))?;
    cfg.validate().map_err(|e| config_error(e.to_string()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

/// Command output: one JSON object per record, tagged with the tick it
/// was emitted on.
pub struct JsonlSink<W: Write> {
    out: W,
    tick: u64,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, tick: 0 }
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> CommandSink<Command> for JsonlSink<W> {
    fn send(
        &mut self,
        commands: &[Command],
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for c in commands {
            let mut v = serde_json::to_value(c)?;
            if let Some(obj) = v.as_object_mut() {
                obj.insert("tick".to_string(), self.tick.into());
            }
            serde_json::to_writer(&mut self.out, &v)?;
            self.out.write_all(b"\n")?;
        }
        self.tick += 1;
        Ok(())
    }
}

/// Stdout or a freshly created file.
pub fn open_output(out: Option<&Path>) -> Result<Box<dyn Write>> {
    match out {
        Some(path) => {
            let f = fs::File::create(path)
                .wrap_err_with(|| format!("create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(f)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

pub fn run_params(cfg: &psd_config::Config) -> RunParams {
    RunParams {
        period: psd_core::util::period(cfg.schedule.control_hz),
        ..RunParams::default()
    }
}

/// Replay a trace as fast as possible on a simulated clock.
pub fn run_replay(
    cfg: &psd_config::Config,
    trace: &Path,
    out: Option<&Path>,
) -> Result<RunStats> {
    let frames = psd_config::load_trace_csv(trace)?;
    tracing::info!(trace = %trace.display(), ticks = frames.len(), "replaying trace");

    let mut psd = build_psd(cfg)?;
    let mut source = psd_core::mocks::ScriptedSource::new(frames);
    let mut sink = JsonlSink::new(open_output(out)?);
    let clock = ManualClock::new();

    let stats = run(
        &mut psd,
        &mut source,
        &mut sink,
        &mut FramePlanner,
        &clock,
        &run_params(cfg),
    )?;
    sink.finish().wrap_err("flush command output")?;
    Ok(stats)
}

/// Report a finished run on stderr (stdout carries the command records).
pub fn report_stats(stats: &RunStats, verbose: bool) {
    if JSON_MODE.get().copied().unwrap_or(false) {
        eprintln!(
            "{}",
            serde_json::json!({
                "ticks": stats.ticks,
                "commands": stats.commands,
                "missed_deadlines": stats.missed_deadlines,
            })
        );
        return;
    }
    eprintln!("Run complete: {} ticks, {} commands.", stats.ticks, stats.commands);
    if verbose {
        eprintln!("\n--- PSD Stats ---");
        eprintln!("Ticks: {}", stats.ticks);
        eprintln!("Commands: {}", stats.commands);
        eprintln!("Missed deadlines (> period): {}", stats.missed_deadlines);
        eprintln!("-----------------\n");
    }
}

/// Validate the config by building the port from it.
pub fn check_config(cfg: &psd_config::Config) -> Result<()> {
    build_psd(cfg)?;
    let s = &cfg.schedule;
    if JSON_MODE.get().copied().unwrap_or(false) {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "control_hz": s.control_hz,
                "steer_divisor": s.steer_divisor,
                "long_divisor": s.long_divisor,
                "openpilot_longitudinal": s.openpilot_longitudinal,
                "engage": format!("{:?}", cfg.cruise.engage).to_ascii_lowercase(),
            })
        );
    } else {
        println!(
            "Config OK: {} Hz control, steering every {} ticks, longitudinal every {} ticks ({}).",
            s.control_hz,
            s.steer_divisor,
            s.long_divisor,
            if s.openpilot_longitudinal {
                "enabled"
            } else {
                "disabled"
            }
        );
    }
    Ok(())
}
