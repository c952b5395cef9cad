//! Gas-pedal double-press gesture, used to engage cruise on cars without
//! stalk buttons.
//!
//! A gesture is: press past `UPPER` for a few ticks, release, press again,
//! release. Each phase must complete within `TIMEOUT_TICKS` ticks.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PedalPhase {
    #[default]
    Idle,
    /// First press released; waiting for the second press.
    Armed,
    /// Second press in progress; waiting for its release.
    Pressed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PedalPressDetector {
    counter: u32,
    phase: PedalPhase,
}

impl PedalPressDetector {
    pub const UPPER: f64 = 0.125;
    pub const NON_ZERO: f64 = 0.01;
    pub const TIMEOUT_TICKS: u32 = 35;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PedalPhase {
        self.phase
    }

    /// Feed one pedal sample; returns `true` on the tick a gesture completes.
    pub fn update(&mut self, gas: f64) -> bool {
        match self.phase {
            PedalPhase::Idle => {
                if gas > Self::UPPER {
                    self.counter += 1;
                    if self.counter == Self::TIMEOUT_TICKS {
                        self.counter = 0;
                        return false;
                    }
                }
                if self.counter > 2 && gas <= Self::NON_ZERO {
                    self.phase = PedalPhase::Armed;
                    self.counter = 0;
                }
                false
            }
            PedalPhase::Armed => {
                if self.tick_timed_out() {
                    return false;
                }
                if gas > Self::UPPER {
                    self.phase = PedalPhase::Pressed;
                    self.counter = 0;
                }
                false
            }
            PedalPhase::Pressed => {
                if self.tick_timed_out() {
                    return false;
                }
                if gas <= Self::NON_ZERO {
                    self.phase = PedalPhase::Idle;
                    self.counter = 0;
                    return true;
                }
                false
            }
        }
    }

    fn tick_timed_out(&mut self) -> bool {
        self.counter += 1;
        if self.counter == Self::TIMEOUT_TICKS {
            self.counter = 0;
            self.phase = PedalPhase::Idle;
            return true;
        }
        false
    }
}
