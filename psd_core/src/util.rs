//! Unit conversion, interpolation and period helpers for psd_core.

use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

pub const KPH_TO_MS: f64 = 1.0 / 3.6;
pub const MS_TO_KPH: f64 = 3.6;

/// Compute the period in microseconds for a given loop rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Tick period for a given loop rate in Hz.
#[inline]
pub fn period(hz: u32) -> Duration {
    Duration::from_micros(period_us(hz))
}

/// Bound `x` to `[lo, hi]` without panicking when the bounds cross; the
/// upper bound wins. NaN passes through as `lo`.
#[inline]
pub fn clip(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Piecewise-linear interpolation over ascending breakpoints `xp`, holding the
/// end values outside the table. Empty tables yield 0.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xp[0] || n == 1 {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // x is strictly inside the table here
    let hi = xp[..n].partition_point(|&b| b <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return fp[lo];
    }
    fp[lo] + (fp[hi] - fp[lo]) * (x - xp[lo]) / span
}

/// Read a signal value as a flag (any non-zero value is set).
#[inline]
pub fn flag(v: f64) -> bool {
    v != 0.0
}
