//! Seams between the planner, the vehicle port and the runner.

use std::time::Duration;

use psd_traits::SignalFrame;
use serde::Serialize;

use crate::error::Result;
use crate::state::VehicleState;

/// HUD hints from the planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HudHints {
    pub lead_visible: bool,
    pub left_lane_visible: bool,
    pub right_lane_visible: bool,
}

/// What the planner wants this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlRequest {
    pub lat_active: bool,
    pub long_active: bool,
    /// Steering torque as a fraction of the ceiling, [-1, 1].
    pub torque: f64,
    /// Longitudinal acceleration (m/s^2).
    pub accel: f64,
    /// Target speed (m/s).
    pub speed: f64,
    /// Ask the stock cruise to cancel.
    pub cancel: bool,
    pub hud: HudHints,
}

/// Actuator values as actually applied, echoed back to the planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ActuatorEcho {
    pub torque: f64,
    pub accel: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Synthesis<C> {
    pub actuators: ActuatorEcho,
    pub commands: Vec<C>,
}

/// A vehicle port: decodes its signals and synthesizes its commands.
pub trait VehicleInterface {
    type Command;

    /// Decode one tick of raw signals. `now` is session time.
    fn decode(&mut self, raw: &SignalFrame, now: Duration) -> Result<VehicleState>;

    /// Turn the planner's request into this tick's command records.
    fn synthesize(
        &mut self,
        state: &VehicleState,
        request: &ControlRequest,
        now: Duration,
    ) -> Synthesis<Self::Command>;
}

/// Source of control requests.
pub trait Planner {
    fn plan(&mut self, frame: &SignalFrame, state: &VehicleState) -> ControlRequest;
}

/// Planner that reads its request from `plan.*` entries in the signal frame.
///
/// Absent entries fall back to following the manual cruise: lateral and
/// longitudinal control track the cruise latch and the target is the set
/// speed. Used for trace replay and the bundled simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramePlanner;

pub mod plan_keys {
    pub const LAT_ACTIVE: &str = "plan.lat_active";
    pub const LONG_ACTIVE: &str = "plan.long_active";
    pub const TORQUE: &str = "plan.torque";
    pub const ACCEL: &str = "plan.accel";
    pub const SPEED: &str = "plan.speed";
    pub const CANCEL: &str = "plan.cancel";
    pub const LEAD_VISIBLE: &str = "plan.lead_visible";
    pub const LEFT_LANE: &str = "plan.left_lane";
    pub const RIGHT_LANE: &str = "plan.right_lane";
}

impl Planner for FramePlanner {
    fn plan(&mut self, frame: &SignalFrame, state: &VehicleState) -> ControlRequest {
        let num = |key: &str, default: f64| frame.get(key).copied().unwrap_or(default);
        let bit = |key: &str, default: bool| frame.get(key).map_or(default, |v| *v != 0.0);
        let engaged = state.cruise.enabled;
        ControlRequest {
            lat_active: bit(plan_keys::LAT_ACTIVE, engaged),
            long_active: bit(plan_keys::LONG_ACTIVE, engaged),
            torque: num(plan_keys::TORQUE, 0.0),
            accel: num(plan_keys::ACCEL, 0.0),
            speed: num(plan_keys::SPEED, state.cruise.speed),
            cancel: bit(plan_keys::CANCEL, false),
            hud: HudHints {
                lead_visible: bit(plan_keys::LEAD_VISIBLE, false),
                left_lane_visible: bit(plan_keys::LEFT_LANE, false),
                right_lane_visible: bit(plan_keys::RIGHT_LANE, false),
            },
        }
    }
}
