//! Target speed shaping for the speed-controlled longitudinal interface.

/// Speed (m/s) above which a rising target is rate limited.
const RATE_LIMIT_ABOVE: f64 = 8.33;
/// Max rise per tick at 100 Hz (m/s).
const MAX_RISE_PER_TICK: f64 = 0.006;

/// The car's own controller closes the loop on speed, so the target speed is
/// anchored to the current speed while braking and eased upward at speed.
#[derive(Debug, Clone, Default)]
pub struct TargetSpeedLimiter {
    reference: f64,
}

impl TargetSpeedLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    pub fn limit(&mut self, target: f64, v_ego: f64, braking: bool) -> f64 {
        self.reference = if braking { v_ego } else { target };
        if v_ego > RATE_LIMIT_ABOVE && target > self.reference {
            return target.min(self.reference + MAX_RISE_PER_TICK);
        }
        target
    }
}
