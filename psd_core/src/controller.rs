//! The Perodua PSD vehicle port (`PeroduaPsd`).
//!
//! Wires the decoder, lane-keep latch and cruise arbiter on the decode side,
//! and the steering limiter, brake synthesizer, target speed limiter and
//! frame scheduler on the synthesis side.

use std::time::Duration;

use psd_traits::SignalFrame;

use crate::brake::{BrakeSynthesizer, brake_magnitude};
use crate::buttons::LaneKeepLatch;
use crate::commands::Command;
use crate::cruise::CruiseSpeedArbiter;
use crate::decoder::SignalDecoder;
use crate::error::Result;
use crate::interface::{ActuatorEcho, ControlRequest, Synthesis, VehicleInterface};
use crate::scheduler::FrameScheduler;
use crate::speed::TargetSpeedLimiter;
use crate::state::VehicleState;
use crate::steering::SteeringLimiter;

pub struct PeroduaPsd {
    pub(crate) decoder: SignalDecoder,
    pub(crate) lane_keep: LaneKeepLatch,
    pub(crate) cruise: CruiseSpeedArbiter,
    pub(crate) steering: SteeringLimiter,
    pub(crate) brake: BrakeSynthesizer,
    pub(crate) speed: TargetSpeedLimiter,
    pub(crate) scheduler: FrameScheduler,
    /// Stock lane-departure warning as sampled on the last steering tick.
    pub(crate) stock_ldw: bool,
}

impl core::fmt::Debug for PeroduaPsd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PeroduaPsd")
            .field("frame", &self.scheduler.frame())
            .field("cruise_engaged", &self.cruise.engaged())
            .field("last_steer", &self.steering.last())
            .field("standstill", &self.brake.state())
            .finish()
    }
}

impl PeroduaPsd {
    /// Frame number of the next tick.
    pub fn frame(&self) -> u64 {
        self.scheduler.frame()
    }

    pub fn cruise(&self) -> &CruiseSpeedArbiter {
        &self.cruise
    }

    pub fn brake(&self) -> &BrakeSynthesizer {
        &self.brake
    }

    pub fn steering(&self) -> &SteeringLimiter {
        &self.steering
    }
}

impl VehicleInterface for PeroduaPsd {
    type Command = Command;

    fn decode(&mut self, raw: &SignalFrame, now: Duration) -> Result<VehicleState> {
        let mut state = self.decoder.decode(raw)?;
        state.lkas_latch = self.lane_keep.update(state.buttons.lane_keep);
        state.cruise = self.cruise.update(&state, now);
        Ok(state)
    }

    fn synthesize(
        &mut self,
        state: &VehicleState,
        request: &ControlRequest,
        now: Duration,
    ) -> Synthesis<Command> {
        let due = self.scheduler.tick();
        let mut commands = Vec::with_capacity(6);

        // ── Steering ─────────────────────────────────────────────────────────
        let requested = self.steering.requested_torque(request.torque, state.v_ego);
        let mut applied =
            self.steering
                .step(requested, state.steering_torque_eps, state.blinker_on());

        // ── Longitudinal targets ─────────────────────────────────────────────
        let mut magnitude = brake_magnitude(
            request.accel,
            state.gas_pressed,
            state.stock.brake_mag,
            state.v_ego,
            self.brake.cfg(),
        );
        let des_speed = self.speed.limit(request.speed, state.v_ego, magnitude > 0.0);

        if due.diagnostic {
            commands.push(Command::diagnostic_clear());
        }

        if let Some(counter) = due.steer {
            self.stock_ldw = state.stock.lane_depart_warning;
            if self.stock_ldw && !request.lat_active {
                applied = self.steering.override_command(-state.stock.ldp_steer_v);
            }
            let steer_request = (request.lat_active || self.stock_ldw)
                && state.lkas_latch
                && !state.stock.lka_disabled();
            commands.push(Command::SteeringLkas {
                torque: applied,
                steer_request,
                counter,
            });
        }

        if due.long {
            if request.cancel {
                commands.push(Command::PcmButtons {
                    set_minus: false,
                    res_plus: false,
                    cancel: true,
                });
            }

            let out = self
                .brake
                .update(magnitude, request.long_active, state.standstill, now);
            magnitude = out.magnitude;
            let pump = out.pump.value();

            commands.push(Command::AccCmdHud {
                set_speed: state.cruise.speed_cluster,
                acc_ready: true,
                long_active: request.long_active,
                lead_visible: request.hud.lead_visible,
                des_speed,
                brake_magnitude: magnitude,
                pump,
                follow_distance: state.stock.follow_distance,
            });
            // Stock AEB only passes through while we are not in control.
            commands.push(Command::AccBrake {
                long_active: request.long_active,
                brake_request: out.brake_request,
                pump,
                brake_magnitude: magnitude,
                aeb: !request.long_active && state.stock.aeb_v,
            });
            commands.push(Command::LkasHud {
                lkas_available: state.cruise.available && state.lkas_latch,
                lat_active: request.lat_active,
                left_lane: request.hud.left_lane_visible,
                right_lane: request.hud.right_lane_visible,
                ldw: self.stock_ldw,
                fcw: state.stock.fcw,
                aeb: state.stock.aeb,
                front_depart: state.stock.front_depart_warning,
                lkc_off: state.stock.lkc_off,
                fcw_off: state.stock.fcw_off,
            });
        }

        tracing::trace!(
            frame = due.frame,
            applied,
            magnitude,
            commands = commands.len(),
            "tick"
        );

        Synthesis {
            actuators: ActuatorEcho {
                torque: self.steering.fraction(applied),
                accel: request.accel,
                speed: request.speed,
            },
            commands,
        }
    }
}
