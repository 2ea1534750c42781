//! Millisecond clock abstraction.
//!
//! Mirrors a microcontroller tick counter: a `u32` that wraps, with deltas
//! computed by wrapping subtraction so they stay correct across the wrap.

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic millisecond counter plus a blocking sleep.
pub trait Clock {
    /// Current tick count. Wraps at `u32::MAX`.
    fn ticks_ms(&self) -> u32;

    /// Block for roughly `ms` milliseconds.
    fn sleep_ms(&self, ms: u32);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn ticks_ms(&self) -> u32 {
        (**self).ticks_ms()
    }

    fn sleep_ms(&self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}

/// Signed difference `end - start` in milliseconds, correct across wrap.
#[inline]
pub fn ticks_diff(end: u32, start: u32) -> i64 {
    end.wrapping_sub(start) as i32 as i64
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn ticks_ms(&self) -> u32 {
        // truncation is the wrap
        self.origin.elapsed().as_millis() as u32
    }

    fn sleep_ms(&self, ms: u32) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}
