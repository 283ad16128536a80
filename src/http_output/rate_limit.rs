//! Time-based send suppression.
//!
//! The gate remembers when the last attempt was made and rejects attempts that
//! arrive within `rate_limit_msec` of it. The timestamp is taken immediately
//! before the network call and is kept even if that call fails, so a failing
//! request still suppresses a following one inside the window. That ordering
//! is part of the observable contract and is intentionally left as is.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in seconds since the UNIX epoch.
pub type TimeProvider = Box<dyn Fn() -> f64 + Send + Sync>;

/// Returns the current time in fractional seconds since the UNIX epoch.
///
/// Returns 0.0 if the system clock is before the UNIX epoch.
pub fn system_time_provider() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Suppresses attempts made too soon after the previous one.
pub struct RateLimiter {
    window_msec: u64,
    last_attempt: Option<f64>,
    time_provider: TimeProvider,
}

impl RateLimiter {
    /// Create a limiter with a `window_msec` window. Zero disables limiting.
    pub fn new(window_msec: u64, time_provider: TimeProvider) -> Self {
        Self {
            window_msec,
            last_attempt: None,
            time_provider,
        }
    }

    /// Create a limiter reading the system clock.
    pub fn with_system_clock(window_msec: u64) -> Self {
        Self::new(window_msec, Box::new(system_time_provider))
    }

    /// Current time according to the configured provider.
    pub fn now(&self) -> f64 {
        (self.time_provider)()
    }

    /// Whether an attempt at `now` may proceed.
    pub fn should_send(&self, now: f64) -> bool {
        let Some(last) = self.last_attempt else {
            return true;
        };
        if self.window_msec == 0 {
            return true;
        }
        let elapsed_msec = (now - last) * 1000.0;
        elapsed_msec >= self.window_msec as f64
    }

    /// Note that an attempt is being made at `now`.
    pub fn record_attempt(&mut self, now: f64) {
        self.last_attempt = Some(now);
    }

    /// Timestamp of the last recorded attempt.
    pub fn last_attempt(&self) -> Option<f64> {
        self.last_attempt
    }

    pub fn window_msec(&self) -> u64 {
        self.window_msec
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window_msec", &self.window_msec)
            .field("last_attempt", &self.last_attempt)
            .finish()
    }
}
