//! Test and helper mocks for psd_core

use std::collections::VecDeque;

use psd_traits::{CommandSink, SignalFrame, SignalSource};

use crate::decoder::sig;

/// A full, benign signal frame: parked, doors shut, belt on, cruise
/// available, no pedals or buttons pressed, lane keep ready.
pub fn baseline_signals() -> SignalFrame {
    let mut f = SignalFrame::new();
    for name in sig::REQUIRED {
        f.insert((*name).to_string(), 0.0);
    }
    // Gas pedal step bit is active-low.
    f.insert(sig::GAS_STEP.to_string(), 1.0);
    f.insert(sig::CRUISE_AVAILABLE.to_string(), 1.0);
    f.insert(sig::LKAS_SET.to_string(), 1.0);
    f
}

/// Baseline frame with some signals overridden.
pub fn frame_with(overrides: &[(&str, f64)]) -> SignalFrame {
    let mut f = baseline_signals();
    for (name, v) in overrides {
        f.insert((*name).to_string(), *v);
    }
    f
}

/// Replays a fixed list of frames, then reports exhaustion.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    frames: VecDeque<SignalFrame>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = SignalFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl SignalSource for ScriptedSource {
    fn read(&mut self) -> Result<Option<SignalFrame>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.frames.pop_front())
    }
}

/// A source whose upstream link is down.
pub struct FailingSource;

impl SignalSource for FailingSource {
    fn read(&mut self) -> Result<Option<SignalFrame>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("bus offline")))
    }
}

/// Keeps every batch it is sent, one entry per tick.
#[derive(Debug, Clone)]
pub struct RecordingSink<C> {
    pub batches: Vec<Vec<C>>,
}

impl<C> Default for RecordingSink<C> {
    fn default() -> Self {
        Self {
            batches: Vec::new(),
        }
    }
}

impl<C: Clone> CommandSink<C> for RecordingSink<C> {
    fn send(&mut self, commands: &[C]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.batches.push(commands.to_vec());
        Ok(())
    }
}
