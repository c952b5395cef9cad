//! Runtime configuration for the PSD control core.
//!
//! These are the structs the components hold at runtime. They are separate
//! from the TOML-deserialized config in `psd_config`; see `conversions`.

use std::time::Duration;

/// Steering torque limits.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringCfg {
    /// Torque ceiling in raw EPS units.
    pub max_torque: i32,
    /// Max per-tick growth of the command magnitude.
    pub delta_up: i32,
    /// Max per-tick shrink of the command magnitude.
    pub delta_down: i32,
    /// Driver torque multiplier for the override allowance.
    pub driver_allowance: f64,
    /// Same, while exactly one turn signal is on.
    pub blinker_driver_allowance: f64,
    /// Speed breakpoints (m/s) for the requested-torque scale.
    pub torque_bp: Vec<f64>,
    pub torque_v: Vec<f64>,
}

impl Default for SteeringCfg {
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

/// Brake magnitude shaping and standstill pump cycling.
#[derive(Debug, Clone, PartialEq)]
pub struct BrakeCfg {
    /// Deceleration (m/s^2) per unit of brake magnitude.
    pub scale: f64,
    pub max_magnitude: f64,
    /// Weight of the stock ACC brake request in the blend.
    pub stock_blend: f64,
    /// Below this speed (m/s) the magnitude is capped at `low_speed_max`.
    pub low_speed_threshold: f64,
    pub low_speed_max: f64,
    /// Added to the requested magnitude when a standstill hold begins.
    pub standstill_margin: f64,
    /// Time spent holding before the pump is released.
    pub reset_interval: Duration,
    /// Time the pump stays released.
    pub reset_duration: Duration,
}

impl Default for BrakeCfg {
    fn default() -> Self {
        Self {
            scale: 1.4,
            max_magnitude: 1.25,
            stock_blend: 0.6,
            low_speed_threshold: 2.8,
            low_speed_max: 0.8,
            standstill_margin: 0.2,
            reset_interval: Duration::from_millis(1500),
            reset_duration: Duration::from_millis(100),
        }
    }
}

/// How the driver engages manual cruise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngageMode {
    /// Release of the plus/minus stalk buttons.
    #[default]
    Buttons,
    /// Double press of the gas pedal (interceptor-equipped cars).
    Pedal,
}

/// Manual cruise set-speed arbitration.
#[derive(Debug, Clone, PartialEq)]
pub struct CruiseCfg {
    pub min_kph: f64,
    pub max_kph: f64,
    /// A release within this window of the press is a tap.
    pub tap_window: Duration,
    /// Held time per 5 km/h step.
    pub hold_step: Duration,
    pub engage: EngageMode,
}

impl Default for CruiseCfg {
    fn default() -> Self {
        Self {
            min_kph: 30.0,
            max_kph: 125.0,
            tap_window: Duration::from_secs(1),
            hold_step: Duration::from_millis(600),
            engage: EngageMode::Buttons,
        }
    }
}

/// Signal decoding knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderCfg {
    pub wheel_speed_factor: f64,
    pub hud_multiplier: f64,
    pub standstill_threshold: f64,
    pub steering_pressed_threshold: f64,
    pub enable_bsm: bool,
}

impl Default for DecoderCfg {
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

/// Tick cadence of outgoing command groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCfg {
    /// Must be 100; the speed filter and tick-counted timers assume it.
    pub control_hz: u32,
    pub steer_divisor: u64,
    pub long_divisor: u64,
    /// Diagnostic clear is emitted on frames `0..dtc_clear_frames`
    /// (exclusive; 0 disables it). The default covers frames 0 through 1000.
    pub dtc_clear_frames: u64,
    /// Longitudinal commands are only emitted when we own longitudinal control.
    pub openpilot_longitudinal: bool,
}

impl Default for ScheduleCfg {
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
