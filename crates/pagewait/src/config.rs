//! Process-wide wait configuration.

use serde::{Deserialize, Serialize};

use crate::result::{PagewaitError, PagewaitResult};
use crate::wait::WaitSpec;

/// Environment variable overriding the action/load timeout
pub const ENV_TIMEOUT_MS: &str = "PAGEWAIT_TIMEOUT_MS";

/// Environment variable overriding the polling interval
pub const ENV_POLL_INTERVAL_MS: &str = "PAGEWAIT_POLL_INTERVAL_MS";

/// Environment variable giving probes a short wait (below 2 = single pass)
pub const ENV_PROBE_TIMEOUT_MS: &str = "PAGEWAIT_PROBE_TIMEOUT_MS";

/// Default waits for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagewaitConfig {
    /// Wait used by actions, failing reads and readiness gates
    pub wait: WaitSpec,
    /// Wait used by boolean/text probes
    pub probe_wait: WaitSpec,
}

impl Default for PagewaitConfig {
    fn default() -> Self {
        Self {
            wait: WaitSpec::default(),
            probe_wait: WaitSpec::immediate(),
        }
    }
}

impl PagewaitConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action/load wait
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    /// Set the probe wait
    #[must_use]
    pub const fn with_probe_wait(mut self, probe_wait: WaitSpec) -> Self {
        self.probe_wait = probe_wait;
        self
    }

    /// Read overrides from the process environment
    pub fn from_env() -> PagewaitResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults.
    ///
    /// Malformed values are errors rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> PagewaitResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(timeout_ms) = parse_ms(&lookup, ENV_TIMEOUT_MS)? {
            config.wait.timeout_ms = timeout_ms;
        }
        if let Some(poll_ms) = parse_ms(&lookup, ENV_POLL_INTERVAL_MS)? {
            config.wait.poll_interval_ms = poll_ms;
        }
        if let Some(probe_ms) = parse_ms(&lookup, ENV_PROBE_TIMEOUT_MS)? {
            // too short to poll more than once
            config.probe_wait = if probe_ms < 2 {
                WaitSpec::immediate()
            } else {
                WaitSpec::new(probe_ms, config.wait.poll_interval_ms.min(probe_ms / 2).max(1))
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate both wait specs
    pub fn validate(&self) -> PagewaitResult<()> {
        self.wait.validate()?;
        self.probe_wait.validate()
    }
}

fn parse_ms<F>(lookup: &F, key: &str) -> PagewaitResult<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|_| {
                PagewaitError::invalid_wait_spec(format!(
                    "{key} must be a whole number of milliseconds, got `{raw}`"
                ))
            })
        })
        .transpose()
}
