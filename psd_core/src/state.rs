//! Canonical per-tick vehicle snapshot.

use serde::Serialize;

/// Arbitrated manual-cruise output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CruiseState {
    pub available: bool,
    pub enabled: bool,
    /// Set speed as shown on the cluster (m/s).
    pub speed_cluster: f64,
    /// Set speed converted to ground speed (m/s).
    pub speed: f64,
}

/// Raw levels of the driver's buttons this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ButtonLevels {
    pub plus: bool,
    pub minus: bool,
    /// Either cancel channel.
    pub cancel: bool,
    pub lane_keep: bool,
    pub generic_toggle: bool,
}

/// Readings from the stock camera/radar ADAS stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StockAdas {
    pub aeb: bool,
    pub fcw: bool,
    /// Stock emergency brake request.
    pub aeb_v: bool,
    pub lane_depart_warning: bool,
    /// Torque the stock lane-departure prevention would apply.
    pub ldp_steer_v: f64,
    pub front_depart_warning: bool,
    pub lkc_off: bool,
    pub fcw_off: bool,
    pub lkas_ready: bool,
    /// Stock ACC brake request, positive means braking.
    pub brake_mag: f64,
    /// Stock ACC command speed (km/h); non-zero while stock ACC is engaged.
    pub acc_cmd: f64,
    pub acc_set_speed: f64,
    pub follow_distance: f64,
}

impl StockAdas {
    #[inline]
    pub fn lka_disabled(&self) -> bool {
        !self.lkas_ready
    }
}

/// Everything the control laws need to know about the car for one tick.
///
/// Produced fresh every tick by `VehicleInterface::decode` and only read
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VehicleState {
    /// Wheel-derived speed (m/s).
    pub v_ego_raw: f64,
    /// Filtered speed (m/s).
    pub v_ego: f64,
    /// Filtered acceleration (m/s^2).
    pub a_ego: f64,
    /// Speed shown on the cluster (m/s).
    pub v_ego_cluster: f64,
    pub standstill: bool,

    pub gas: f64,
    pub gas_pressed: bool,
    pub brake: f64,
    pub brake_pressed: bool,
    pub interceptor_gas: f64,

    pub steering_angle_deg: f64,
    pub steering_torque: f64,
    pub steering_torque_eps: f64,
    pub steering_pressed: bool,

    pub buttons: ButtonLevels,
    pub door_open: bool,
    pub seatbelt_unlatched: bool,
    pub left_blinker: bool,
    pub right_blinker: bool,
    pub left_blindspot: bool,
    pub right_blindspot: bool,

    pub stock: StockAdas,
    pub lkas_latch: bool,
    pub cruise: CruiseState,
}

impl VehicleState {
    /// Exactly one turn signal is on.
    #[inline]
    pub fn blinker_on(&self) -> bool {
        self.left_blinker != self.right_blinker
    }
}
