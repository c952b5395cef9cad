//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "psd", version, about = "Perodua PSD control core")]
pub struct Cli {
    /// Path to config TOML (built-in defaults when omitted)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log and report errors as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recorded signal trace (CSV) through the control core
    Replay {
        /// Trace CSV: header of signal names, one row per control tick
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
        /// Write command records here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Print loop stats on completion
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Drive a simulated car: engage cruise, brake to a stop and hold
    Simulate {
        /// Simulated drive length
        #[arg(long, value_name = "SECS", default_value_t = 15.0)]
        seconds: f64,
        /// Pace the loop on the wall clock (Ctrl-C stops it)
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Write command records here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Print loop stats on completion
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Validate the config and exit
    CheckConfig,
}
