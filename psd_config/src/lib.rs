#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and signal-trace parsing for the PSD control core.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The trace CSV loader turns a recorded drive into one signal map per tick.
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Steering {
    /// Torque ceiling in raw EPS units.
    pub max_torque: i32,
    /// Max per-tick increase in torque magnitude.
    pub delta_up: i32,
    /// Max per-tick decrease in torque magnitude.
    pub delta_down: i32,
    /// Driver torque multiplier for the override allowance.
    pub driver_allowance: f64,
    /// Same, while a turn signal is on.
    pub blinker_driver_allowance: f64,
    /// Speed breakpoints (m/s) for the torque ceiling table.
    pub torque_bp: Vec<f64>,
    /// Torque ceiling at each breakpoint.
    pub torque_v: Vec<f64>,
}

impl Default for Steering {
    fn default() -> Self {
        Self {
            max_torque: 255,
            delta_up: 10,
            delta_down: 30,
            driver_allowance: 1.5,
            blinker_driver_allowance: 10.0,
            torque_bp: vec![0.0],
            torque_v: vec![255.0],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Brake {
    /// Deceleration (m/s^2) per unit of brake magnitude.
    pub scale: f64,
    pub max_magnitude: f64,
    /// Weight applied to the stock ACC brake request before blending.
    pub stock_blend: f64,
    /// Below this speed (m/s) the magnitude is capped at `low_speed_max`.
    pub low_speed_threshold: f64,
    pub low_speed_max: f64,
    /// Added to the requested magnitude when standstill hold begins.
    pub standstill_margin: f64,
    pub reset_interval_ms: u64,
    pub reset_duration_ms: u64,
}

impl Default for Brake {
    fn default() -> Self {
        Self {
            scale: 1.4,
            max_magnitude: 1.25,
            stock_blend: 0.6,
            low_speed_threshold: 2.8,
            low_speed_max: 0.8,
            standstill_margin: 0.2,
            reset_interval_ms: 1500,
            reset_duration_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngageMode {
    #[default]
    Buttons,
    Pedal,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cruise {
    pub min_kph: f64,
    pub max_kph: f64,
    /// A release within this window of the press counts as a tap.
    pub tap_window_ms: u64,
    /// Held duration per 5 km/h step.
    pub hold_step_ms: u64,
    /// How the driver engages: "buttons" (default) or "pedal".
    pub engage: EngageMode,
}

impl Default for Cruise {
    fn default() -> Self {
        Self {
            min_kph: 30.0,
            max_kph: 125.0,
            tap_window_ms: 1000,
            hold_step_ms: 600,
            engage: EngageMode::Buttons,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Decoder {
    pub wheel_speed_factor: f64,
    /// Cluster speed reads this much above the wheel-derived speed.
    pub hud_multiplier: f64,
    /// Raw speed (m/s) below which the car is at standstill.
    pub standstill_threshold: f64,
    /// Driver torque above which the wheel counts as held.
    pub steering_pressed_threshold: f64,
    /// Decode blind-spot chime into the blind-spot flags.
    pub enable_bsm: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            wheel_speed_factor: 1.0,
            hud_multiplier: 1.04,
            standstill_threshold: 0.01,
            steering_pressed_threshold: 20.0,
            enable_bsm: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Control loop rate. Only 100 Hz is accepted: the speed filter gains and
    /// the tick-counted timers assume it.
    pub control_hz: u32,
    /// Steering command every N ticks.
    pub steer_divisor: u32,
    /// Longitudinal command set every N ticks.
    pub long_divisor: u32,
    /// Emit the diagnostic clear record on ticks `0..dtc_clear_frames` (0 disables).
    /// The default covers ticks 0 through 1000.
    pub dtc_clear_frames: u64,
    /// The platform is driven by our longitudinal commands.
    pub openpilot_longitudinal: bool,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            control_hz: 100,
            steer_divisor: 2,
            long_divisor: 5,
            dtc_clear_frames: 1001,
            openpilot_longitudinal: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub steering: Steering,
    pub brake: Brake,
    pub cruise: Cruise,
    pub decoder: Decoder,
    pub schedule: Schedule,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Steering
        if self.steering.max_torque <= 0 {
            eyre::bail!("steering.max_torque must be > 0");
        }
        if self.steering.delta_up <= 0 || self.steering.delta_down <= 0 {
            eyre::bail!("steering.delta_up and steering.delta_down must be > 0");
        }
        if self.steering.delta_up > self.steering.max_torque {
            eyre::bail!("steering.delta_up must not exceed steering.max_torque");
        }
        if self.steering.driver_allowance < 0.0 || self.steering.blinker_driver_allowance < 0.0 {
            eyre::bail!("steering driver allowances must be >= 0");
        }
        if self.steering.torque_bp.is_empty()
            || self.steering.torque_bp.len() != self.steering.torque_v.len()
        {
            eyre::bail!("steering.torque_bp and steering.torque_v must be non-empty and equal length");
        }
        if self.steering.torque_bp.windows(2).any(|w| w[1] <= w[0]) {
            eyre::bail!("steering.torque_bp must be strictly increasing");
        }
        let ceiling = f64::from(self.steering.max_torque);
        if self
            .steering
            .torque_v
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0 || *v > ceiling)
        {
            eyre::bail!("steering.torque_v entries must be in [0, steering.max_torque]");
        }

        // Brake
        if !(self.brake.scale.is_finite() && self.brake.scale > 0.0) {
            eyre::bail!("brake.scale must be > 0");
        }
        if !(self.brake.max_magnitude > 0.0 && self.brake.max_magnitude <= 4.0) {
            eyre::bail!("brake.max_magnitude must be in (0.0, 4.0]");
        }
        if !(0.0..=1.0).contains(&self.brake.stock_blend) {
            eyre::bail!("brake.stock_blend must be in [0.0, 1.0]");
        }
        if self.brake.low_speed_threshold < 0.0 {
            eyre::bail!("brake.low_speed_threshold must be >= 0");
        }
        if !(self.brake.low_speed_max > 0.0 && self.brake.low_speed_max <= self.brake.max_magnitude)
        {
            eyre::bail!("brake.low_speed_max must be in (0.0, brake.max_magnitude]");
        }
        if self.brake.standstill_margin < 0.0 {
            eyre::bail!("brake.standstill_margin must be >= 0");
        }
        if self.brake.reset_interval_ms == 0 || self.brake.reset_duration_ms == 0 {
            eyre::bail!("brake.reset_interval_ms and brake.reset_duration_ms must be >= 1");
        }

        // Cruise
        if !(self.cruise.min_kph > 0.0 && self.cruise.min_kph < self.cruise.max_kph) {
            eyre::bail!("cruise.min_kph must be > 0 and below cruise.max_kph");
        }
        if self.cruise.max_kph > 250.0 {
            eyre::bail!("cruise.max_kph is unreasonably large (>250)");
        }
        if self.cruise.tap_window_ms == 0 {
            eyre::bail!("cruise.tap_window_ms must be >= 1");
        }
        if self.cruise.hold_step_ms == 0 {
            eyre::bail!("cruise.hold_step_ms must be >= 1");
        }

        // Decoder
        if !(self.decoder.wheel_speed_factor > 0.0) {
            eyre::bail!("decoder.wheel_speed_factor must be > 0");
        }
        if !(self.decoder.hud_multiplier > 0.0) {
            eyre::bail!("decoder.hud_multiplier must be > 0");
        }
        if self.decoder.standstill_threshold < 0.0 {
            eyre::bail!("decoder.standstill_threshold must be >= 0");
        }

        // Schedule
        if self.schedule.control_hz != 100 {
            eyre::bail!("schedule.control_hz must be 100");
        }
        if self.schedule.steer_divisor == 0 || self.schedule.long_divisor == 0 {
            eyre::bail!("schedule divisors must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of never|daily|hourly");
            }
        }

        Ok(())
    }
}

/// Parse one trace cell. Numbers pass through; `true`/`false` map to 1/0.
fn parse_cell(cell: &str) -> Option<f64> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        other => other.parse::<f64>().ok(),
    }
}

/// Load a recorded signal trace.
///
/// Expected layout: a header row of signal names (`MESSAGE.SIGNAL`, or
/// `plan.*` for planner inputs) followed by one row per control tick. Blank
/// cells leave the signal out of that tick's map.
///
/// Example:
/// WHEEL_SPEED.WHEELSPEED_F,BRAKE.BRAKE_ENGAGED,plan.accel
/// 12.5,0,-0.4
pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<HashMap<String, f64>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().any(String::is_empty) {
        eyre::bail!("trace CSV must have a non-empty header for every column");
    }
    for (i, h) in headers.iter().enumerate() {
        if headers[..i].contains(h) {
            eyre::bail!("trace CSV has duplicate column '{h}'");
        }
    }

    let mut frames = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        let mut frame = HashMap::with_capacity(headers.len());
        for (name, cell) in headers.iter().zip(rec.iter()) {
            if cell.is_empty() {
                continue;
            }
            let Some(v) = parse_cell(cell) else {
                eyre::bail!("invalid value '{cell}' for '{name}' in CSV row {}", idx + 2);
            };
            frame.insert(name.clone(), v);
        }
        frames.push(frame);
    }

    if frames.is_empty() {
        eyre::bail!("trace CSV {:?} has no rows", path);
    }
    Ok(frames)
}
