//! Raw named signals → `VehicleState`.
//!
//! Bit-level unpacking happens upstream; here every signal is a plain number
//! keyed `MESSAGE.SIGNAL`. Apart from the ego-speed filter the mapping is
//! stateless.

use psd_traits::SignalFrame;

use crate::config::DecoderCfg;
use crate::error::{PsdError, Result};
use crate::state::{ButtonLevels, CruiseState, StockAdas, VehicleState};
use crate::util::{KPH_TO_MS, flag};

/// Signal names understood by the decoder.
pub mod sig {
    pub const WHEEL_SPEED: &str = "WHEEL_SPEED.WHEELSPEED_F";
    pub const GAS: &str = "GAS_PEDAL.APPS_1";
    pub const GAS_STEP: &str = "GAS_PEDAL_2.GAS_PEDAL_STEP";
    pub const INTERCEPTOR_GAS: &str = "GAS_SENSOR.INTERCEPTOR_GAS";
    pub const BRAKE_PRESSURE: &str = "BRAKE.BRAKE_PRESSURE";
    pub const BRAKE_ENGAGED: &str = "BRAKE.BRAKE_ENGAGED";
    pub const STEER_ANGLE: &str = "STEERING_MODULE.STEER_ANGLE";
    pub const MAIN_TORQUE: &str = "STEERING_MODULE.MAIN_TORQUE";
    pub const EPS_TORQUE: &str = "EPS_SHAFT_TORQUE.STEERING_TORQUE";
    pub const MAIN_DOOR: &str = "METER_CLUSTER.MAIN_DOOR";
    pub const LEFT_FRONT_DOOR: &str = "METER_CLUSTER.LEFT_FRONT_DOOR";
    pub const RIGHT_BACK_DOOR: &str = "METER_CLUSTER.RIGHT_BACK_DOOR";
    pub const LEFT_BACK_DOOR: &str = "METER_CLUSTER.LEFT_BACK_DOOR";
    pub const SEAT_BELT: &str = "METER_CLUSTER.SEAT_BELT_WARNING";
    pub const SEAT_BELT_2: &str = "METER_CLUSTER.SEAT_BELT_WARNING2";
    pub const LEFT_SIGNAL: &str = "METER_CLUSTER.LEFT_SIGNAL";
    pub const RIGHT_SIGNAL: &str = "METER_CLUSTER.RIGHT_SIGNAL";
    pub const UI_SPEED: &str = "BUTTONS.UI_SPEED";
    pub const LKC_BTN: &str = "BUTTONS.LKC_BTN";
    pub const SET_MINUS: &str = "PCM_BUTTONS.SET_MINUS";
    pub const RES_PLUS: &str = "PCM_BUTTONS.RES_PLUS";
    pub const CANCEL: &str = "PCM_BUTTONS.CANCEL";
    pub const CANCEL_HYBRID: &str = "PCM_BUTTONS_HYBRID.CANCEL";
    pub const CRUISE_AVAILABLE: &str = "ACC_CMD_HUD.SET_ME_1_2";
    pub const ACC_CMD: &str = "ACC_CMD_HUD.ACC_CMD";
    pub const ACC_SET_SPEED: &str = "ACC_CMD_HUD.SET_SPEED";
    pub const FOLLOW_DISTANCE: &str = "ACC_CMD_HUD.FOLLOW_DISTANCE";
    pub const ACC_BRAKE_MAG: &str = "ACC_BRAKE.MAGNITUDE";
    pub const AEB_REQUEST: &str = "ACC_BRAKE.AEB_1019";
    pub const LDP_STEER: &str = "STEERING_LKAS.STEER_CMD";
    pub const AEB_BRAKE: &str = "LKAS_HUD.AEB_BRAKE";
    pub const AEB_ALARM: &str = "LKAS_HUD.AEB_ALARM";
    pub const LDA_OFF: &str = "LKAS_HUD.LDA_OFF";
    pub const LKAS_SET: &str = "LKAS_HUD.LKAS_SET";
    pub const FCW_DISABLE: &str = "LKAS_HUD.FCW_DISABLE";
    pub const LDA_ALERT: &str = "LKAS_HUD.LDA_ALERT";
    pub const FRONT_DEPART: &str = "LKAS_HUD.FRONT_DEPART";
    pub const GENERIC_TOGGLE: &str = "RIGHT_STALK.GENERIC_TOGGLE";
    pub const BSM_CHIME: &str = "BSM.BSM_CHIME";

    /// Signals whose absence makes a frame undecodable.
    pub const REQUIRED: &[&str] = &[
        WHEEL_SPEED,
        GAS,
        GAS_STEP,
        BRAKE_PRESSURE,
        BRAKE_ENGAGED,
        STEER_ANGLE,
        MAIN_TORQUE,
        EPS_TORQUE,
        MAIN_DOOR,
        LEFT_FRONT_DOOR,
        RIGHT_BACK_DOOR,
        LEFT_BACK_DOOR,
        SEAT_BELT,
        LEFT_SIGNAL,
        RIGHT_SIGNAL,
        UI_SPEED,
        LKC_BTN,
        SET_MINUS,
        RES_PLUS,
        CANCEL,
        CRUISE_AVAILABLE,
    ];
}

/// Two-state (speed, acceleration) steady-state Kalman filter on the raw
/// wheel speed. Gains are for a 100 Hz update.
#[derive(Debug, Clone, Default)]
pub struct SpeedEstimator {
    v: f64,
    a: f64,
}

impl SpeedEstimator {
    const DT: f64 = 0.01;
    const K: [f64; 2] = [0.122_876_73, 0.296_663_09];
    /// Measurement jump (m/s) that re-seeds the filter instead of tracking it.
    const RESET_JUMP: f64 = 2.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one raw speed sample and return `(v_ego, a_ego)`.
    pub fn update(&mut self, v_raw: f64) -> (f64, f64) {
        if !v_raw.is_finite() {
            return (self.v, self.a);
        }
        if (v_raw - self.v).abs() > Self::RESET_JUMP {
            self.v = v_raw;
            self.a = 0.0;
        }
        let v_pred = self.a.mul_add(Self::DT, self.v);
        let innovation = v_raw - v_pred;
        self.v = Self::K[0].mul_add(innovation, v_pred);
        self.a = Self::K[1].mul_add(innovation, self.a);
        (self.v, self.a)
    }
}

/// Maps a raw signal frame to the decoder-owned part of `VehicleState`.
///
/// The lane-keep latch and arbitrated cruise state are filled in by the
/// vehicle interface afterwards; `cruise.available` is decoded here.
#[derive(Debug, Clone)]
pub struct SignalDecoder {
    cfg: DecoderCfg,
    speed: SpeedEstimator,
}

fn required(frame: &SignalFrame, name: &str) -> Result<f64> {
    frame
        .get(name)
        .copied()
        .ok_or_else(|| eyre::Report::new(PsdError::MissingSignal(name.to_string())))
}

#[inline]
fn optional(frame: &SignalFrame, name: &str, default: f64) -> f64 {
    frame.get(name).copied().unwrap_or(default)
}

impl SignalDecoder {
    pub fn new(cfg: DecoderCfg) -> Self {
        Self {
            cfg,
            speed: SpeedEstimator::new(),
        }
    }

    pub fn cfg(&self) -> &DecoderCfg {
        &self.cfg
    }

    pub fn decode(&mut self, frame: &SignalFrame) -> Result<VehicleState> {
        // Only the front axle speed is trustworthy (the rear counter wraps
        // near 60 km/h), so it stands in for all four wheels.
        let wheel = required(frame, sig::WHEEL_SPEED)? * KPH_TO_MS * self.cfg.wheel_speed_factor;
        let v_ego_raw = wheel;
        let (v_ego, a_ego) = self.speed.update(v_ego_raw);

        let door_open = [
            sig::MAIN_DOOR,
            sig::LEFT_FRONT_DOOR,
            sig::RIGHT_BACK_DOOR,
            sig::LEFT_BACK_DOOR,
        ]
        .iter()
        .map(|name| required(frame, name).map(flag))
        .collect::<Result<Vec<bool>>>()?
        .into_iter()
        .any(|open| open);
        let seatbelt_unlatched = required(frame, sig::SEAT_BELT)? == 1.0
            || optional(frame, sig::SEAT_BELT_2, 0.0) == 1.0;

        let steering_torque = required(frame, sig::MAIN_TORQUE)?;
        let buttons = ButtonLevels {
            plus: flag(required(frame, sig::RES_PLUS)?),
            minus: flag(required(frame, sig::SET_MINUS)?),
            cancel: flag(required(frame, sig::CANCEL)?)
                || flag(optional(frame, sig::CANCEL_HYBRID, 0.0)),
            lane_keep: flag(required(frame, sig::LKC_BTN)?),
            generic_toggle: flag(optional(frame, sig::GENERIC_TOGGLE, 0.0)),
        };

        let stock = StockAdas {
            aeb: flag(optional(frame, sig::AEB_BRAKE, 0.0)),
            fcw: flag(optional(frame, sig::AEB_ALARM, 0.0)),
            aeb_v: flag(optional(frame, sig::AEB_REQUEST, 0.0)),
            lane_depart_warning: flag(optional(frame, sig::LDA_ALERT, 0.0)),
            ldp_steer_v: optional(frame, sig::LDP_STEER, 0.0),
            front_depart_warning: flag(optional(frame, sig::FRONT_DEPART, 0.0)),
            lkc_off: flag(optional(frame, sig::LDA_OFF, 0.0)),
            fcw_off: flag(optional(frame, sig::FCW_DISABLE, 0.0)),
            lkas_ready: flag(optional(frame, sig::LKAS_SET, 1.0)),
            brake_mag: -optional(frame, sig::ACC_BRAKE_MAG, 0.0),
            acc_cmd: optional(frame, sig::ACC_CMD, 0.0),
            acc_set_speed: optional(frame, sig::ACC_SET_SPEED, 0.0),
            follow_distance: optional(frame, sig::FOLLOW_DISTANCE, 0.0),
        };

        let bsm = self.cfg.enable_bsm && flag(optional(frame, sig::BSM_CHIME, 0.0));

        Ok(VehicleState {
            v_ego_raw,
            v_ego,
            a_ego,
            v_ego_cluster: required(frame, sig::UI_SPEED)? * KPH_TO_MS * self.cfg.hud_multiplier,
            standstill: v_ego_raw < self.cfg.standstill_threshold,
            gas: required(frame, sig::GAS)?,
            gas_pressed: !flag(required(frame, sig::GAS_STEP)?),
            brake: required(frame, sig::BRAKE_PRESSURE)?,
            brake_pressed: flag(required(frame, sig::BRAKE_ENGAGED)?),
            interceptor_gas: optional(frame, sig::INTERCEPTOR_GAS, 0.0).max(0.0),
            steering_angle_deg: required(frame, sig::STEER_ANGLE)?,
            steering_torque,
            steering_torque_eps: required(frame, sig::EPS_TORQUE)?,
            steering_pressed: steering_torque.abs() > self.cfg.steering_pressed_threshold,
            buttons,
            door_open,
            seatbelt_unlatched,
            left_blinker: flag(required(frame, sig::LEFT_SIGNAL)?),
            right_blinker: flag(required(frame, sig::RIGHT_SIGNAL)?),
            // The chime does not say which side; it gates lane changes both ways.
            left_blindspot: bsm,
            right_blindspot: bsm,
            stock,
            lkas_latch: false,
            cruise: CruiseState {
                available: flag(required(frame, sig::CRUISE_AVAILABLE)?),
                ..CruiseState::default()
            },
        })
    }
}
