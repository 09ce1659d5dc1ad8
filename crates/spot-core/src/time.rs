//! Wall-clock sources for the time-driven gait planner.
//!
//! The planner never reads a global clock; callers pass `now` explicitly.
//! [`Clock`] is the seam: [`MonotonicClock`] for the real control loop,
//! [`ManualClock`] for simulation and tests.

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A source of "now" in seconds.
pub trait Clock {
    /// Current time in seconds. Must be non-decreasing between calls.
    fn now_secs(&self) -> f64;
}

// ---------------------------------------------------------------------------
// MonotonicClock
// ---------------------------------------------------------------------------

/// Real time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since construction.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Integer-nanosecond clock advanced explicitly.
///
/// Tracks time as a `u64` nanosecond count so repeated fixed-`dt` steps do
/// not accumulate floating-point drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManualClock {
    nanos: u64,
}

impl ManualClock {
    /// Create a clock at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0 }
    }

    /// Create a clock at `secs` seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_secs(secs: f64) -> Self {
        Self {
            nanos: (secs * 1_000_000_000.0) as u64,
        }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Advance the clock by `delta_secs` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance_secs(&mut self, delta_secs: f64) {
        let delta_nanos = (delta_secs * 1_000_000_000.0).round() as u64;
        self.nanos = self.nanos.saturating_add(delta_nanos);
    }

    /// Advance the clock by a [`Duration`].
    #[allow(clippy::cast_possible_truncation)]
    pub const fn advance(&mut self, duration: Duration) {
        self.nanos = self.nanos.saturating_add(duration.as_nanos() as u64);
    }

    /// Reset the clock to zero.
    pub const fn reset(&mut self) {
        self.nanos = 0;
    }
}

impl Clock for ManualClock {
    #[allow(clippy::cast_precision_loss)]
    fn now_secs(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
