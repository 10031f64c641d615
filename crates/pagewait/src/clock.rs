//! Time source for the poller.
//!
//! `SystemClock` is the real thing: a monotonic origin and a plain blocking
//! sleep. `ManualClock` is a fake clock for deterministic tests; its time only
//! moves when someone sleeps on it or advances it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time plus blocking sleep
pub trait Clock: Send + Sync + fmt::Debug {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by [`Instant`] and [`std::thread::sleep`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    #[must_use]
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fake clock: sleeping advances virtual time instantly
#[derive(Debug, Default)]
pub struct ManualClock {
    now_nanos: AtomicU64,
    sleeps: AtomicU64,
}

impl ManualClock {
    /// Create a clock at virtual time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move virtual time forward without counting a sleep
    pub fn advance(&self, duration: Duration) {
        let _ = self
            .now_nanos
            .fetch_add(duration_to_nanos(duration), Ordering::SeqCst);
    }

    /// Number of times [`Clock::sleep`] was called
    #[must_use]
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        let _ = self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.advance(duration);
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
