//! Per-tick command cadence.

use crate::config::ScheduleCfg;

/// Which command groups are due on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub frame: u64,
    pub diagnostic: bool,
    /// Rolling counter for the steering command, when one is due.
    pub steer: Option<u8>,
    pub long: bool,
}

/// Monotonic frame counter deciding what goes out each tick.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    cfg: ScheduleCfg,
    frame: u64,
}

impl FrameScheduler {
    pub fn new(cfg: ScheduleCfg) -> Self {
        Self { cfg, frame: 0 }
    }

    pub fn cfg(&self) -> &ScheduleCfg {
        &self.cfg
    }

    /// Frame number of the next tick.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Plan the current tick and advance the counter.
    pub fn tick(&mut self) -> Due {
        let frame = self.frame;
        let steer_div = self.cfg.steer_divisor.max(1);
        let long_div = self.cfg.long_divisor.max(1);
        let due = Due {
            frame,
            diagnostic: frame < self.cfg.dtc_clear_frames,
            steer: (frame % steer_div == 0).then(|| ((frame / steer_div) % 16) as u8),
            long: self.cfg.openpilot_longitudinal && frame % long_div == 0,
        };
        if frame + 1 == self.cfg.dtc_clear_frames {
            tracing::debug!(frame, "diagnostic clear window closed");
        }
        self.frame = self.frame.wrapping_add(1);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_wraps_every_sixteen_steering_frames() {
        let mut s = FrameScheduler::new(ScheduleCfg::default());
        let counters: Vec<u8> = (0..40).filter_map(|_| s.tick().steer).collect();
        assert_eq!(counters.len(), 20);
        assert_eq!(&counters[..3], &[0, 1, 2]);
        assert_eq!(counters[15], 15);
        assert_eq!(counters[16], 0);
    }

    #[test]
    fn long_group_needs_longitudinal_ownership() {
        let cfg = ScheduleCfg {
            openpilot_longitudinal: false,
            ..ScheduleCfg::default()
        };
        let mut s = FrameScheduler::new(cfg);
        assert!((0..20).all(|_| !s.tick().long));
    }
}
