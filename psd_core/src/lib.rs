#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Actuation and estimation core for the Perodua PSD platform.
//!
//! This crate sits between a generic driving planner and the car's buses.
//! Signal unpacking and bus framing live upstream/downstream behind
//! `psd_traits::SignalSource` and `psd_traits::CommandSink`.
//!
//! ## Architecture
//!
//! - **Decoding**: raw signals → `VehicleState` (`decoder` module), incl. the
//!   ego-speed Kalman filter
//! - **Cruise**: manual set-speed FSM driven by button edges (`cruise`)
//! - **Steering**: driver-aware torque rate limiting (`steering`)
//! - **Brake**: standstill pump cycling and pump quantization (`brake`)
//! - **Scheduling**: per-tick cadence and command ordering (`scheduler`,
//!   `controller`)
//! - **Runner**: fixed-rate loop over the collaborator traits (`runner`)
//!
//! Everything runs on one thread once per tick; session time is passed in
//! explicitly so the control laws never read a clock themselves.

pub mod brake;
pub mod builder;
pub mod buttons;
pub mod commands;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod cruise;
pub mod decoder;
pub mod error;
pub mod interface;
pub mod mocks;
pub mod pedal;
pub mod runner;
pub mod scheduler;
pub mod speed;
pub mod state;
pub mod steering;
pub mod util;

pub use brake::{BrakeOutput, BrakeSynthesizer, PumpLevel, StandstillState};
pub use builder::{PsdBuilder, build_psd};
pub use commands::Command;
pub use config::{BrakeCfg, CruiseCfg, DecoderCfg, EngageMode, ScheduleCfg, SteeringCfg};
pub use controller::PeroduaPsd;
pub use cruise::CruiseSpeedArbiter;
pub use decoder::SignalDecoder;
pub use error::{BuildError, PsdError, Result};
pub use interface::{
    ActuatorEcho, ControlRequest, FramePlanner, HudHints, Planner, Synthesis, VehicleInterface,
};
pub use runner::{RunParams, RunStats};
pub use scheduler::FrameScheduler;
pub use state::{CruiseState, VehicleState};
pub use steering::SteeringLimiter;
