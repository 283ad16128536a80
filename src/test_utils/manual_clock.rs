//! Hand-driven clock for rate limiter tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::http_output::TimeProvider;

/// Clock whose time only moves when a test says so.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Create a clock reading `start` seconds.
    pub fn at(start: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn now(&self) -> f64 {
        *self.now.lock()
    }

    pub fn set(&self, seconds: f64) {
        *self.now.lock() = seconds;
    }

    /// Move the clock forward by `msec` milliseconds.
    pub fn advance_ms(&self, msec: u64) {
        *self.now.lock() += msec as f64 / 1000.0;
    }

    /// Time provider reading this clock.
    pub fn provider(&self) -> TimeProvider {
        let now = Arc::clone(&self.now);
        Box::new(move || *now.lock())
    }
}
