//! Injected wall-clock.
//!
//! The VM never reads system time directly; it goes through a [`TimeSource`]
//! so verification and build tests can pin the clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds-resolution unix clock.
pub trait TimeSource: Send + Sync {
    /// Current unix time in whole seconds.
    fn unix_now(&self) -> i64;
}

/// Production clock backed by [`SystemTime`].
#[derive(Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn unix_now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

/// Settable clock for tests.
#[cfg(any(test, feature = "dev-context-only-utils"))]
pub struct ManualClock(std::sync::atomic::AtomicI64);

#[cfg(any(test, feature = "dev-context-only-utils"))]
impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(std::sync::atomic::AtomicI64::new(now))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "dev-context-only-utils"))]
impl TimeSource for ManualClock {
    fn unix_now(&self) -> i64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}
