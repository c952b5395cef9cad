//! Manual cruise set-speed arbitration.
//!
//! The car has no stock set-speed memory we can use, so the set speed and the
//! engage latch live here and are driven from button edges (or pedal gestures,
//! see `EngageMode::Pedal`).

use std::time::Duration;

use crate::buttons::{Edge, EdgeDetector};
use crate::config::{CruiseCfg, EngageMode};
use crate::pedal::PedalPressDetector;
use crate::state::{CruiseState, VehicleState};
use crate::util::{KPH_TO_MS, interp};

/// Set-speed step while a button is held (km/h).
const HOLD_STEP_KPH: f64 = 5.0;
/// Set-speed step for a tap (km/h).
const TAP_STEP_KPH: f64 = 1.0;
/// Pedal mode: ticks between interceptor-driven set-speed bumps.
const PEDAL_BUMP_TICKS: u32 = 100;
/// Pedal mode: interceptor gas above which a bump is applied.
const PEDAL_BUMP_GAS: f64 = 0.2;
/// Cluster-to-ground speed ratio over ego speed.
const HUD_RATIO_BP: [f64; 2] = [0.0, 140.0];
const HUD_RATIO_V: [f64; 2] = [1.0615, 1.0170];

/// Why the latch was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisengageReason {
    DoorOpen,
    SeatbeltUnlatched,
    Cancel,
    BrakePressed,
    Unavailable,
    Pedal,
}

impl DisengageReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DoorOpen => "door open",
            Self::SeatbeltUnlatched => "seatbelt unlatched",
            Self::Cancel => "cancel",
            Self::BrakePressed => "brake pressed",
            Self::Unavailable => "cruise unavailable",
            Self::Pedal => "pedal",
        }
    }
}

/// Next multiple of 5 km/h strictly above `kph`.
#[inline]
fn step_up(kph: f64) -> f64 {
    ((kph + 1e-6) / HOLD_STEP_KPH).floor().mul_add(HOLD_STEP_KPH, HOLD_STEP_KPH)
}

/// Next multiple of 5 km/h strictly below `kph`.
#[inline]
fn step_down(kph: f64) -> f64 {
    ((kph - 1e-6) / HOLD_STEP_KPH).ceil().mul_add(HOLD_STEP_KPH, -HOLD_STEP_KPH)
}

/// Cruise session: set speed, engage latch and button timing.
#[derive(Debug, Clone)]
pub struct CruiseSpeedArbiter {
    cfg: CruiseCfg,
    speed_kph: f64,
    latched: bool,
    plus: EdgeDetector,
    minus: EdgeDetector,
    /// Shared by both buttons; a press of either restarts it.
    rising_edge_since: Duration,
    held: Duration,
    last_now: Duration,
    pedal: PedalPressDetector,
    pedal_ticks: u32,
}

impl CruiseSpeedArbiter {
    pub fn new(cfg: CruiseCfg) -> Self {
        let speed_kph = cfg.min_kph;
        Self {
            cfg,
            speed_kph,
            latched: false,
            plus: EdgeDetector::new(),
            minus: EdgeDetector::new(),
            rising_edge_since: Duration::ZERO,
            held: Duration::ZERO,
            last_now: Duration::ZERO,
            pedal: PedalPressDetector::new(),
            pedal_ticks: 0,
        }
    }

    pub fn engaged(&self) -> bool {
        self.latched
    }

    /// Current set speed in km/h (cluster scale).
    pub fn speed_kph(&self) -> f64 {
        self.speed_kph
    }

    /// Run one tick of arbitration against the decoded state.
    pub fn update(&mut self, state: &VehicleState, now: Duration) -> CruiseState {
        match self.cfg.engage {
            EngageMode::Buttons => self.update_buttons(state, now),
            EngageMode::Pedal => self.update_pedal(state),
        }

        self.clamp();

        let reason = if state.door_open {
            Some(DisengageReason::DoorOpen)
        } else if state.seatbelt_unlatched {
            Some(DisengageReason::SeatbeltUnlatched)
        } else if state.buttons.cancel {
            Some(DisengageReason::Cancel)
        } else if state.brake_pressed {
            Some(DisengageReason::BrakePressed)
        } else if !state.cruise.available {
            Some(DisengageReason::Unavailable)
        } else {
            None
        };
        if let Some(reason) = reason {
            self.disengage(reason);
        }

        let speed_cluster = self.speed_kph * KPH_TO_MS;
        CruiseState {
            available: state.cruise.available,
            enabled: self.latched,
            speed_cluster,
            speed: speed_cluster / interp(state.v_ego, &HUD_RATIO_BP, &HUD_RATIO_V),
        }
    }

    fn update_buttons(&mut self, state: &VehicleState, now: Duration) {
        let plus = self.plus.update(state.buttons.plus);
        let minus = self.minus.update(state.buttons.minus);

        if self.latched {
            self.held = self
                .held
                .saturating_add(now.saturating_sub(self.last_now));
            self.last_now = now;
            self.handle_button(plus, now, 1.0);
            self.handle_button(minus, now, -1.0);
        } else if plus == Edge::Falling || minus == Edge::Falling {
            self.engage(state.v_ego_cluster, now);
        }
    }

    /// Apply one button's edge while engaged. `dir` is +1 for plus, -1 for minus.
    fn handle_button(&mut self, edge: Edge, now: Duration, dir: f64) {
        match edge {
            Edge::Falling => {
                if now.saturating_sub(self.rising_edge_since) < self.cfg.tap_window {
                    self.speed_kph += dir * TAP_STEP_KPH;
                    self.clamp();
                }
            }
            Edge::Rising => {
                self.rising_edge_since = now;
                self.held = Duration::ZERO;
            }
            Edge::High => {
                // A late tick may owe several steps.
                while self.held >= self.cfg.hold_step {
                    self.speed_kph = if dir > 0.0 {
                        step_up(self.speed_kph)
                    } else {
                        step_down(self.speed_kph)
                    };
                    self.clamp();
                    self.held -= self.cfg.hold_step;
                }
            }
            Edge::Low => {}
        }
    }

    fn update_pedal(&mut self, state: &VehicleState) {
        if self.latched {
            if self.pedal.update(state.interceptor_gas) {
                self.disengage(DisengageReason::Pedal);
            } else {
                self.pedal_ticks += 1;
                if self.pedal_ticks >= PEDAL_BUMP_TICKS {
                    self.pedal_ticks = 0;
                    if state.interceptor_gas > PEDAL_BUMP_GAS {
                        self.speed_kph += HOLD_STEP_KPH;
                    }
                }
            }
        }
        if !self.latched && self.pedal.update(state.gas) {
            self.engage(state.v_ego_cluster, Duration::ZERO);
        }
    }

    fn engage(&mut self, v_ego_cluster: f64, now: Duration) {
        self.speed_kph = self.cfg.min_kph.max(v_ego_cluster / KPH_TO_MS);
        self.latched = true;
        self.held = Duration::ZERO;
        self.last_now = now;
        self.pedal_ticks = 0;
        self.clamp();
        tracing::info!(set_kph = self.speed_kph, "cruise engaged");
    }

    fn disengage(&mut self, reason: DisengageReason) {
        if self.latched {
            tracing::info!(reason = reason.as_str(), "cruise disengaged");
        }
        self.latched = false;
    }

    fn clamp(&mut self) {
        self.speed_kph = self.speed_kph.max(self.cfg.min_kph).min(self.cfg.max_kph);
    }
}

#[cfg(test)]
mod tests {
    use super::{step_down, step_up};

    #[test]
    fn steps_land_on_multiples_of_five() {
        assert_eq!(step_up(30.0), 35.0);
        assert_eq!(step_up(31.0), 35.0);
        assert_eq!(step_up(34.0), 35.0);
        assert_eq!(step_down(35.0), 30.0);
        assert_eq!(step_down(36.0), 35.0);
        assert_eq!(step_down(40.0), 35.0);
    }
}
