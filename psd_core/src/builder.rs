//! Builder for `PeroduaPsd`.
//!
//! Every section is optional and falls back to its `Default`. All sections
//! are validated on `build()`.

use crate::brake::BrakeSynthesizer;
use crate::buttons::LaneKeepLatch;
use crate::config::*;
use crate::controller::PeroduaPsd;
use crate::cruise::CruiseSpeedArbiter;
use crate::decoder::SignalDecoder;
use crate::error::{BuildError, Result};
use crate::scheduler::FrameScheduler;
use crate::speed::TargetSpeedLimiter;
use crate::steering::SteeringLimiter;

impl PeroduaPsd {
    /// Start building a PSD port.
    pub fn builder() -> PsdBuilder {
        PsdBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct PsdBuilder {
    steering: Option<SteeringCfg>,
    brake: Option<BrakeCfg>,
    cruise: Option<CruiseCfg>,
    decoder: Option<DecoderCfg>,
    schedule: Option<ScheduleCfg>,
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct the port with fresh sessions.
///
/// This is the single source of truth for validation and construction, used
/// by both `PsdBuilder::build()` and `build_psd()`.
fn validate_and_build(
    steering: SteeringCfg,
    brake: BrakeCfg,
    cruise: CruiseCfg,
    decoder: DecoderCfg,
    schedule: ScheduleCfg,
) -> Result<PeroduaPsd> {
    // ── Validation ───────────────────────────────────────────────────────────
    if steering.max_torque <= 0 {
        return Err(invalid("max_torque must be > 0"));
    }
    if steering.delta_up <= 0 || steering.delta_down <= 0 {
        return Err(invalid("steer deltas must be > 0"));
    }
    if steering.driver_allowance.is_sign_negative()
        || steering.blinker_driver_allowance.is_sign_negative()
    {
        return Err(invalid("driver allowances must be >= 0"));
    }
    if steering.torque_bp.is_empty() || steering.torque_bp.len() != steering.torque_v.len() {
        return Err(invalid("torque_bp/torque_v must be non-empty and equal length"));
    }
    if steering.torque_bp.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(invalid("torque_bp must be strictly increasing"));
    }
    if !(brake.scale.is_finite() && brake.scale > 0.0) {
        return Err(invalid("brake scale must be > 0"));
    }
    if !(brake.max_magnitude > 0.0) {
        return Err(invalid("max brake magnitude must be > 0"));
    }
    if !(0.0..=1.0).contains(&brake.stock_blend) {
        return Err(invalid("stock_blend must be in [0, 1]"));
    }
    if brake.reset_interval.is_zero() || brake.reset_duration.is_zero() {
        return Err(invalid("pump reset timings must be > 0"));
    }
    if !(cruise.min_kph > 0.0 && cruise.min_kph < cruise.max_kph) {
        return Err(invalid("cruise speed bounds must satisfy 0 < min < max"));
    }
    if cruise.hold_step.is_zero() || cruise.tap_window.is_zero() {
        return Err(invalid("cruise timings must be > 0"));
    }
    if !(decoder.hud_multiplier > 0.0 && decoder.wheel_speed_factor > 0.0) {
        return Err(invalid("decoder scale factors must be > 0"));
    }
    if schedule.control_hz != 100 {
        return Err(invalid("control_hz must be 100"));
    }
    if schedule.steer_divisor == 0 || schedule.long_divisor == 0 {
        return Err(invalid("schedule divisors must be >= 1"));
    }

    Ok(PeroduaPsd {
        decoder: SignalDecoder::new(decoder),
        lane_keep: LaneKeepLatch::new(),
        cruise: CruiseSpeedArbiter::new(cruise),
        steering: SteeringLimiter::new(steering),
        brake: BrakeSynthesizer::new(brake),
        speed: TargetSpeedLimiter::new(),
        scheduler: FrameScheduler::new(schedule),
        stock_ldw: false,
    })
}

impl PsdBuilder {
    pub fn with_steering(mut self, steering: SteeringCfg) -> Self {
        self.steering = Some(steering);
        self
    }
    pub fn with_brake(mut self, brake: BrakeCfg) -> Self {
        self.brake = Some(brake);
        self
    }
    pub fn with_cruise(mut self, cruise: CruiseCfg) -> Self {
        self.cruise = Some(cruise);
        self
    }
    pub fn with_decoder(mut self, decoder: DecoderCfg) -> Self {
        self.decoder = Some(decoder);
        self
    }
    pub fn with_schedule(mut self, schedule: ScheduleCfg) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Validate and build the port.
    pub fn build(self) -> Result<PeroduaPsd> {
        validate_and_build(
            self.steering.unwrap_or_default(),
            self.brake.unwrap_or_default(),
            self.cruise.unwrap_or_default(),
            self.decoder.unwrap_or_default(),
            self.schedule.unwrap_or_default(),
        )
    }
}

/// Build a port straight from a deserialized config file.
pub fn build_psd(cfg: &psd_config::Config) -> Result<PeroduaPsd> {
    validate_and_build(
        SteeringCfg::from(&cfg.steering),
        BrakeCfg::from(&cfg.brake),
        CruiseCfg::from(&cfg.cruise),
        DecoderCfg::from(&cfg.decoder),
        ScheduleCfg::from(&cfg.schedule),
    )
}
