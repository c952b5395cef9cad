pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::collections::HashMap;

/// One tick worth of decoded bus signals, keyed `MESSAGE.SIGNAL`.
///
/// Bit-level unpacking happens upstream; by the time a frame reaches the core
/// every value is a plain number (booleans are 0/1).
pub type SignalFrame = HashMap<String, f64>;

/// Upstream decoding layer.
pub trait SignalSource {
    /// Next snapshot of named signals, or `None` once the source is exhausted.
    fn read(&mut self) -> Result<Option<SignalFrame>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Downstream transport layer that packs command records onto the bus.
pub trait CommandSink<C> {
    fn send(&mut self, commands: &[C]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
