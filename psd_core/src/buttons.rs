//! Edge detection on raw button levels and the lane-keep toggle latch.

/// What a button did between the previous tick and this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    High,
    Low,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    last: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, level: bool) -> Edge {
        let edge = match (self.last, level) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            (true, true) => Edge::High,
            (false, false) => Edge::Low,
        };
        self.last = level;
        edge
    }

    pub fn level(&self) -> bool {
        self.last
    }
}

/// Lane-keep enable latch. Set at start; every press-and-release of the
/// lane-keep button flips it.
#[derive(Debug, Clone, Copy)]
pub struct LaneKeepLatch {
    latched: bool,
    press_seen: bool,
}

impl Default for LaneKeepLatch {
    fn default() -> Self {
        Self {
            latched: true,
            press_seen: false,
        }
    }
}

impl LaneKeepLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, pressed: bool) -> bool {
        if pressed {
            self.press_seen = true;
        } else if self.press_seen {
            self.latched = !self.latched;
            self.press_seen = false;
            tracing::debug!(latched = self.latched, "lane keep latch toggled");
        }
        self.latched
    }

    pub fn latched(&self) -> bool {
        self.latched
    }
}
