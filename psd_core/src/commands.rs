//! Outgoing command records.
//!
//! Each record names the signal group it targets and carries the numeric
//! payload; packing onto the bus is the transport's job.

use serde::Serialize;

/// Functional diagnostic address (0x7DF).
pub const DIAGNOSTIC_ADDRESS: u32 = 0x7DF;
/// OBD mode 04: clear diagnostic trouble codes.
pub const DIAGNOSTIC_CLEAR_DTC: [u8; 8] = [0x01, 0x04, 0, 0, 0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "group", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Raw diagnostic request, sent verbatim.
    Diagnostic { address: u32, bus: u8, payload: [u8; 8] },
    SteeringLkas {
        torque: i32,
        steer_request: bool,
        /// 4-bit rolling counter.
        counter: u8,
    },
    PcmButtons {
        set_minus: bool,
        res_plus: bool,
        cancel: bool,
    },
    AccCmdHud {
        /// Set speed shown on the cluster (m/s).
        set_speed: f64,
        acc_ready: bool,
        long_active: bool,
        lead_visible: bool,
        des_speed: f64,
        brake_magnitude: f64,
        pump: f64,
        follow_distance: f64,
    },
    AccBrake {
        long_active: bool,
        brake_request: bool,
        pump: f64,
        brake_magnitude: f64,
        aeb: bool,
    },
    LkasHud {
        lkas_available: bool,
        lat_active: bool,
        left_lane: bool,
        right_lane: bool,
        ldw: bool,
        fcw: bool,
        aeb: bool,
        front_depart: bool,
        lkc_off: bool,
        fcw_off: bool,
    },
}

impl Command {
    pub fn diagnostic_clear() -> Self {
        Self::Diagnostic {
            address: DIAGNOSTIC_ADDRESS,
            bus: 0,
            payload: DIAGNOSTIC_CLEAR_DTC,
        }
    }

    /// Name of the targeted signal group.
    pub fn group(&self) -> &'static str {
        match self {
            Self::Diagnostic { .. } => "DIAGNOSTIC",
            Self::SteeringLkas { .. } => "STEERING_LKAS",
            Self::PcmButtons { .. } => "PCM_BUTTONS",
            Self::AccCmdHud { .. } => "ACC_CMD_HUD",
            Self::AccBrake { .. } => "ACC_BRAKE",
            Self::LkasHud { .. } => "LKAS_HUD",
        }
    }
}
