//! Bounded polling.
//!
//! The poller is the only place that does elapsed-time accounting. Every
//! other layer (probes, actions, readiness gates, assertions) hands it a
//! deadline and a check, so timeout semantics are identical for every
//! condition kind.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::Clock;
use crate::condition::{evaluate, Condition};
use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::session::Session;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for waits (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// WAIT SPEC
// =============================================================================

/// Timeout and polling cadence for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSpec {
    /// Timeout in milliseconds; zero means a single pass
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitSpec {
    /// Create a wait spec
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Single evaluation, no sleeping
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new(0, 0)
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// True for the zero-timeout, single-pass spec
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        self.timeout_ms == 0
    }

    /// Check `0 < poll_interval < timeout` (or a zero timeout)
    pub fn validate(&self) -> PagewaitResult<()> {
        if self.is_immediate() {
            return Ok(());
        }
        if self.poll_interval_ms == 0 {
            return Err(PagewaitError::invalid_wait_spec(
                "poll interval must be positive when a timeout is set",
            ));
        }
        if self.poll_interval_ms >= self.timeout_ms {
            return Err(PagewaitError::invalid_wait_spec(format!(
                "poll interval {}ms must be shorter than timeout {}ms",
                self.poll_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }
}

// =============================================================================
// DEADLINE
// =============================================================================

/// Fixed end point shared by every check in one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started: Duration,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline `budget` from the clock's current time
    #[must_use]
    pub fn start(clock: &dyn Clock, budget: Duration) -> Self {
        Self {
            started: clock.now(),
            budget,
        }
    }

    /// Time since the deadline was started
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started)
    }

    /// Budget left at `now`
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        self.budget.saturating_sub(self.elapsed(now))
    }

    /// Whether the budget is used up at `now`
    #[must_use]
    pub fn expired(&self, now: Duration) -> bool {
        self.elapsed(now) >= self.budget
    }
}

// =============================================================================
// WAIT REPORT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport {
    /// Whether the wait was successful
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of evaluations performed
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitReport {
    /// Create a successful wait report
    #[must_use]
    pub fn success(elapsed: Duration, polls: u32, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            polls,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timed-out wait report
    #[must_use]
    pub fn timeout(elapsed: Duration, polls: u32, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            polls,
            waited_for: waited_for.into(),
        }
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Repeats a check at a fixed cadence until it holds or a deadline passes
#[derive(Debug)]
pub struct Poller<'s, D> {
    session: &'s Session<D>,
}

impl<'s, D: Driver> Poller<'s, D> {
    /// Create a poller over a session
    #[must_use]
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    /// Start a deadline for `spec` on the session clock
    #[must_use]
    pub fn deadline(&self, spec: &WaitSpec) -> Deadline {
        Deadline::start(self.session.clock(), spec.timeout())
    }

    /// Wait for `locator` to satisfy `condition` within `spec`.
    ///
    /// Absence conditions succeed on the first poll if the target is
    /// already gone.
    pub fn wait_for(
        &self,
        locator: &Locator,
        condition: &Condition,
        spec: &WaitSpec,
    ) -> PagewaitResult<WaitReport> {
        spec.validate()?;
        let deadline = self.deadline(spec);
        self.wait_for_until(locator, condition, spec.poll_interval(), deadline)
    }

    /// Same as [`Self::wait_for`] against an existing deadline
    pub fn wait_for_until(
        &self,
        locator: &Locator,
        condition: &Condition,
        poll_interval: Duration,
        deadline: Deadline,
    ) -> PagewaitResult<WaitReport> {
        let waited_for = format!("{locator} {}", condition.describe());
        let driver = self.session.driver();
        let report = self.poll(poll_interval, deadline, &waited_for, || {
            evaluate(driver, locator, condition).is_met_for(condition)
        });

        if report.success {
            Ok(report)
        } else {
            Err(PagewaitError::ConditionTimeout {
                locator: locator.clone(),
                condition: condition.describe(),
                elapsed: report.elapsed,
            })
        }
    }

    /// Core loop: evaluate, return on success, otherwise sleep and retry
    /// until `deadline` expires. Never sleeps past the deadline.
    pub fn poll<F>(
        &self,
        poll_interval: Duration,
        deadline: Deadline,
        waited_for: &str,
        mut attempt: F,
    ) -> WaitReport
    where
        F: FnMut() -> bool,
    {
        let clock = self.session.clock();
        let started = clock.now();
        let mut polls: u32 = 0;

        tracing::debug!(waited_for, budget_ms = %deadline.remaining(started).as_millis(), "wait started");

        loop {
            polls = polls.saturating_add(1);
            if attempt() {
                let elapsed = clock.now().saturating_sub(started);
                tracing::debug!(waited_for, polls, elapsed_ms = %elapsed.as_millis(), "wait satisfied");
                return WaitReport::success(elapsed, polls, waited_for);
            }

            let now = clock.now();
            if deadline.expired(now) {
                let elapsed = now.saturating_sub(started);
                tracing::debug!(waited_for, polls, elapsed_ms = %elapsed.as_millis(), "wait timed out");
                return WaitReport::timeout(elapsed, polls, waited_for);
            }

            tracing::trace!(waited_for, polls, "not yet, sleeping");
            clock.sleep(poll_interval.min(deadline.remaining(now)));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
