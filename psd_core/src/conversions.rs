//! `From` implementations bridging `psd_config` types to `psd_core` types.

use std::time::Duration;

use crate::config::{BrakeCfg, CruiseCfg, DecoderCfg, EngageMode, ScheduleCfg, SteeringCfg};

// ── SteeringCfg ──────────────────────────────────────────────────────────────

impl From<&psd_config::Steering> for SteeringCfg {
    fn from(c: &psd_config::Steering) -> Self {
        Self {
            max_torque: c.max_torque,
            delta_up: c.delta_up,
            delta_down: c.delta_down,
            driver_allowance: c.driver_allowance,
            blinker_driver_allowance: c.blinker_driver_allowance,
            torque_bp: c.torque_bp.clone(),
            torque_v: c.torque_v.clone(),
        }
    }
}

// ── BrakeCfg ─────────────────────────────────────────────────────────────────

impl From<&psd_config::Brake> for BrakeCfg {
    fn from(c: &psd_config::Brake) -> Self {
        Self {
            scale: c.scale,
            max_magnitude: c.max_magnitude,
            stock_blend: c.stock_blend,
            low_speed_threshold: c.low_speed_threshold,
            low_speed_max: c.low_speed_max,
            standstill_margin: c.standstill_margin,
            reset_interval: Duration::from_millis(c.reset_interval_ms),
            reset_duration: Duration::from_millis(c.reset_duration_ms),
        }
    }
}

// ── CruiseCfg ────────────────────────────────────────────────────────────────

impl From<psd_config::EngageMode> for EngageMode {
    fn from(m: psd_config::EngageMode) -> Self {
        match m {
            psd_config::EngageMode::Buttons => Self::Buttons,
            psd_config::EngageMode::Pedal => Self::Pedal,
        }
    }
}

impl From<&psd_config::Cruise> for CruiseCfg {
    fn from(c: &psd_config::Cruise) -> Self {
        Self {
            min_kph: c.min_kph,
            max_kph: c.max_kph,
            tap_window: Duration::from_millis(c.tap_window_ms),
            hold_step: Duration::from_millis(c.hold_step_ms),
            engage: c.engage.into(),
        }
    }
}

// ── DecoderCfg ───────────────────────────────────────────────────────────────

impl From<&psd_config::Decoder> for DecoderCfg {
    fn from(c: &psd_config::Decoder) -> Self {
        Self {
            wheel_speed_factor: c.wheel_speed_factor,
            hud_multiplier: c.hud_multiplier,
            standstill_threshold: c.standstill_threshold,
            steering_pressed_threshold: c.steering_pressed_threshold,
            enable_bsm: c.enable_bsm,
        }
    }
}

// ── ScheduleCfg ──────────────────────────────────────────────────────────────

impl From<&psd_config::Schedule> for ScheduleCfg {
    fn from(c: &psd_config::Schedule) -> Self {
        Self {
            control_hz: c.control_hz,
            steer_divisor: u64::from(c.steer_divisor),
            long_divisor: u64::from(c.long_divisor),
            dtc_clear_frames: c.dtc_clear_frames,
            openpilot_longitudinal: c.openpilot_longitudinal,
        }
    }
}
