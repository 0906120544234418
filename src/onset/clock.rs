//! Timestamp sources for time-based debouncing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of monotonic timestamps in milliseconds.
pub trait Clock {
    /// Current time in milliseconds. Only differences between readings matter.
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock measured from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at zero.
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
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Externally driven clock.
///
/// Clones share the same time value, so a host can keep one handle and move
/// another into the engine, advancing time from its own transport or sample
/// position.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: f64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    /// Set the current time.
    pub fn set_ms(&self, ms: f64) {
        self.millis.store(ms.to_bits(), Ordering::Relaxed);
    }

    /// Move the current time forward by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: f64) {
        self.set_ms(self.now_ms() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.millis.load(Ordering::Relaxed))
    }
}
