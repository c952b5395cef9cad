//! Brake synthesis for the pump-based service brake.
//!
//! - `brake_magnitude`: planner deceleration → brake magnitude
//! - `StandstillState`: periodic pump release while holding the car stopped
//! - `PumpLevel`: quantized, slew-limited pump command

use std::time::Duration;

use serde::Serialize;

use crate::config::BrakeCfg;
use crate::util::clip;

/// Magnitude at or above which the brake request bit is set.
pub const BRAKE_THRESHOLD: f64 = 0.01;

/// Upper edge of each pump level's magnitude band, matched to the stock
/// controller's pump behaviour so the pump stays quiet.
pub const BRAKE_MAG: [f64; 11] = [
    BRAKE_THRESHOLD,
    0.32,
    0.46,
    0.61,
    0.76,
    0.90,
    1.06,
    1.21,
    1.35,
    1.51,
    4.0,
];

/// Pump duty in tenths, 0..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct PumpLevel(u8);

impl PumpLevel {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(10);

    pub fn from_tenths(tenths: u8) -> Self {
        Self(tenths.min(Self::MAX.0))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// Pump level for a brake magnitude: the first band whose edge is at or
    /// above it. Anything past the last edge saturates.
    pub fn quantize(magnitude: f64) -> Self {
        if !(magnitude > 0.0) {
            return Self::ZERO;
        }
        let idx = BRAKE_MAG.partition_point(|&edge| edge < magnitude);
        Self::from_tenths(u8::try_from(idx).unwrap_or(Self::MAX.0))
    }

    /// Move at most one tenth toward `target`; larger jumps bleed the brake.
    pub fn slew_toward(self, target: Self) -> Self {
        match target.0.cmp(&self.0) {
            std::cmp::Ordering::Greater => Self(self.0 + 1),
            std::cmp::Ordering::Less => Self(self.0 - 1),
            std::cmp::Ordering::Equal => self,
        }
    }
}

/// Brake magnitude requested by the planner, blended with the stock ACC.
///
/// No brake while the driver is on the gas or the planner asks for
/// non-negative acceleration.
pub fn brake_magnitude(
    accel: f64,
    gas_pressed: bool,
    stock_brake_mag: f64,
    v_ego: f64,
    cfg: &BrakeCfg,
) -> f64 {
    let planner = if gas_pressed || !(accel < 0.0) {
        0.0
    } else {
        clip((accel / cfg.scale).abs(), 0.0, cfg.max_magnitude)
    };
    let stock = if stock_brake_mag.is_finite() {
        stock_brake_mag * cfg.stock_blend
    } else {
        0.0
    };
    let mut magnitude = stock.max(planner);
    // Less jerk near a stop.
    if v_ego < cfg.low_speed_threshold {
        magnitude = clip(magnitude, 0.0, cfg.low_speed_max);
    }
    magnitude
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandstillState {
    #[default]
    StandstillInit,
    BrakeHold,
    PumpReset,
}

/// Result of one brake synthesis step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrakeOutput {
    pub pump: PumpLevel,
    pub brake_request: bool,
    /// Magnitude after the standstill state machine.
    pub magnitude: f64,
    pub state: StandstillState,
}

/// Brake session: pump history and the standstill hold state machine.
#[derive(Debug, Clone)]
pub struct BrakeSynthesizer {
    cfg: BrakeCfg,
    last_pump: PumpLevel,
    state: StandstillState,
    floor: f64,
    since: Duration,
}

impl BrakeSynthesizer {
    pub fn new(cfg: BrakeCfg) -> Self {
        Self {
            cfg,
            last_pump: PumpLevel::ZERO,
            state: StandstillState::StandstillInit,
            floor: 0.0,
            since: Duration::ZERO,
        }
    }

    pub fn cfg(&self) -> &BrakeCfg {
        &self.cfg
    }

    pub fn state(&self) -> StandstillState {
        self.state
    }

    pub fn last_pump(&self) -> PumpLevel {
        self.last_pump
    }

    /// One longitudinal emission: standstill handling, quantization and the
    /// request flag.
    pub fn update(
        &mut self,
        magnitude: f64,
        long_active: bool,
        standstill: bool,
        now: Duration,
    ) -> BrakeOutput {
        let magnitude = if magnitude.is_finite() { magnitude } else { 0.0 };
        let magnitude = self.standstill(magnitude, long_active, standstill, now);

        let pump = self.last_pump.slew_toward(PumpLevel::quantize(magnitude));
        self.last_pump = pump;

        BrakeOutput {
            pump,
            brake_request: magnitude >= BRAKE_THRESHOLD,
            magnitude,
            state: self.state,
        }
    }

    fn standstill(&mut self, magnitude: f64, long_active: bool, standstill: bool, now: Duration) -> f64 {
        if !(long_active && magnitude > 0.0 && standstill) {
            if self.state != StandstillState::StandstillInit {
                tracing::debug!(from = ?self.state, "standstill hold released");
            }
            self.state = StandstillState::StandstillInit;
            self.since = now;
            return magnitude;
        }

        if self.state == StandstillState::StandstillInit {
            self.floor = magnitude + self.cfg.standstill_margin;
        }

        let dt = now.saturating_sub(self.since);
        let next = match self.state {
            StandstillState::PumpReset if dt >= self.cfg.reset_duration => {
                StandstillState::BrakeHold
            }
            StandstillState::BrakeHold | StandstillState::StandstillInit
                if dt >= self.cfg.reset_interval =>
            {
                StandstillState::PumpReset
            }
            s => s,
        };
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "standstill transition");
            self.state = next;
            self.since = now;
        }

        match self.state {
            StandstillState::PumpReset => 0.0,
            _ => self.floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_uses_first_band_at_or_above() {
        assert_eq!(PumpLevel::quantize(0.0), PumpLevel::ZERO);
        assert_eq!(PumpLevel::quantize(0.01), PumpLevel::ZERO);
        assert_eq!(PumpLevel::quantize(0.011).tenths(), 1);
        assert_eq!(PumpLevel::quantize(0.32).tenths(), 1);
        assert_eq!(PumpLevel::quantize(1.0).tenths(), 6);
        assert_eq!(PumpLevel::quantize(9.0), PumpLevel::MAX);
        assert_eq!(PumpLevel::quantize(f64::NAN), PumpLevel::ZERO);
    }

    #[test]
    fn slew_moves_one_tenth() {
        let p = PumpLevel::ZERO.slew_toward(PumpLevel::MAX);
        assert_eq!(p.tenths(), 1);
        assert_eq!(PumpLevel::MAX.slew_toward(PumpLevel::ZERO).tenths(), 9);
        assert_eq!(p.slew_toward(p), p);
    }
}
