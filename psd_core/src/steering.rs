//! Steering torque limiting.

use crate::config::SteeringCfg;
use crate::util::{clip, interp};

/// Bound a requested torque by the driver-override allowance and the
/// per-tick rate limits relative to the last command.
///
/// The allowance shrinks the permitted torque in the direction the driver is
/// already steering against; a turn signal widens the driver's authority.
pub fn apply_steer_torque_limits(
    requested: i32,
    last: i32,
    driver_torque: f64,
    blinker_on: bool,
    cfg: &SteeringCfg,
) -> i32 {
    let ceiling = f64::from(cfg.max_torque);
    let up = f64::from(cfg.delta_up);
    let down = f64::from(cfg.delta_down);
    let last = f64::from(last);

    let mult = if blinker_on {
        cfg.blinker_driver_allowance
    } else {
        cfg.driver_allowance
    };
    let driver = if driver_torque.is_finite() {
        driver_torque
    } else {
        0.0
    };
    let max_allowed = ceiling.min(driver.mul_add(mult, ceiling)).max(0.0);
    let min_allowed = (-ceiling).max(driver.mul_add(-mult, -ceiling)).min(0.0);
    let mut torque = clip(f64::from(requested), min_allowed, max_allowed);

    // Growth in magnitude is slow, release is fast.
    torque = if last > 0.0 {
        clip(torque, (last - down).max(-up), last + up)
    } else {
        clip(torque, last - up, (last + down).min(up))
    };

    torque.round_ties_even() as i32
}

/// Steering session: remembers the last command sent to the EPS.
#[derive(Debug, Clone)]
pub struct SteeringLimiter {
    cfg: SteeringCfg,
    last: i32,
}

impl SteeringLimiter {
    pub fn new(cfg: SteeringCfg) -> Self {
        Self { cfg, last: 0 }
    }

    pub fn cfg(&self) -> &SteeringCfg {
        &self.cfg
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    /// Raw torque request from the planner's fraction at the current speed.
    pub fn requested_torque(&self, fraction: f64, v_ego: f64) -> i32 {
        let fraction = if fraction.is_finite() { fraction } else { 0.0 };
        let scale = interp(v_ego, &self.cfg.torque_bp, &self.cfg.torque_v);
        let limit = f64::from(self.cfg.max_torque) * 2.0;
        clip((fraction * scale).round_ties_even(), -limit, limit) as i32
    }

    /// Limit `requested` against the last command and record the result.
    pub fn step(&mut self, requested: i32, driver_torque: f64, blinker_on: bool) -> i32 {
        let applied =
            apply_steer_torque_limits(requested, self.last, driver_torque, blinker_on, &self.cfg);
        self.last = applied;
        applied
    }

    /// Replace this tick's command (stock lane-departure passthrough).
    /// The value is clamped to the torque ceiling.
    pub fn override_command(&mut self, torque: f64) -> i32 {
        let ceiling = f64::from(self.cfg.max_torque);
        let torque = if torque.is_finite() { torque } else { 0.0 };
        let applied = clip(torque.round_ties_even(), -ceiling, ceiling) as i32;
        self.last = applied;
        applied
    }

    /// Actuator echo as a fraction of the torque ceiling.
    pub fn fraction(&self, applied: i32) -> f64 {
        f64::from(applied) / f64::from(self.cfg.max_torque)
    }
}
