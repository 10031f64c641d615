//! Scoped browser session handle.
//!
//! The test lifecycle creates one `Session` per scenario and lends it to the
//! page objects it drives. Pages never create or hold a driver of their own.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::PagewaitConfig;
use crate::dispatch::Dispatcher;
use crate::driver::Driver;
use crate::result::PagewaitResult;
use crate::wait::Poller;

/// Driver, clock and default waits for one scenario
#[derive(Debug)]
pub struct Session<D> {
    driver: D,
    clock: Arc<dyn Clock>,
    config: PagewaitConfig,
}

impl<D: Driver> Session<D> {
    /// Wrap a driver with the system clock and default waits
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            clock: Arc::new(SystemClock::new()),
            config: PagewaitConfig::default(),
        }
    }

    /// Wrap a driver using waits from the environment
    pub fn from_env(driver: D) -> PagewaitResult<Self> {
        Ok(Self::new(driver).with_config(PagewaitConfig::from_env()?))
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the default waits
    #[must_use]
    pub fn with_config(mut self, config: PagewaitConfig) -> Self {
        self.config = config;
        self
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Session clock
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Default waits
    #[must_use]
    pub const fn config(&self) -> &PagewaitConfig {
        &self.config
    }

    /// Poller bound to this session
    #[must_use]
    pub const fn poller(&self) -> Poller<'_, D> {
        Poller::new(self)
    }

    /// Dispatcher using this session's default waits
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<'_, D> {
        Dispatcher::new(self)
    }

    /// Give the driver back to the lifecycle that owns it
    pub fn into_driver(self) -> D {
        self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::mock::MockSurface;
    use crate::wait::WaitSpec;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let clock = Arc::new(ManualClock::new());
        let session = Session::new(MockSurface::new(clock));
        assert_eq!(session.config(), &PagewaitConfig::default());
    }

    #[test]
    fn test_with_clock_shares_time() {
        let clock = Arc::new(ManualClock::new());
        let session = Session::new(MockSurface::new(clock.clone())).with_clock(clock.clone());
        clock.advance(Duration::from_millis(40));
        assert_eq!(session.clock().now(), Duration::from_millis(40));
    }

    #[test]
    fn test_dispatcher_inherits_config() {
        let clock = Arc::new(ManualClock::new());
        let config = PagewaitConfig::new().with_wait(WaitSpec::new(3000, 300));
        let session = Session::new(MockSurface::new(clock)).with_config(config);
        assert_eq!(session.dispatcher().wait_spec(), WaitSpec::new(3000, 300));
    }

    #[test]
    fn test_into_driver() {
        let clock = Arc::new(ManualClock::new());
        let session = Session::new(MockSurface::new(clock).with_title("Swag Labs"));
        let surface = session.into_driver();
        assert_eq!(surface.title_now(), "Swag Labs");
    }
}
