//! Result and error types for pagewait.

use std::time::Duration;
use thiserror::Error;

use crate::driver::DriverError;
use crate::locator::Locator;

/// Result type for pagewait operations
pub type PagewaitResult<T> = Result<T, PagewaitError>;

/// Errors surfaced by actions, readiness waits and page definitions.
///
/// Probes never produce these; they degrade to `false` or `""` instead.
#[derive(Debug, Error)]
pub enum PagewaitError {
    /// A condition never became true within the wait budget
    #[error("timed out after {}ms waiting for {locator} to be {condition}", elapsed.as_millis())]
    ConditionTimeout {
        /// Locator that was polled
        locator: Locator,
        /// Human-readable condition that was never met
        condition: String,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// The precondition held but the element was gone when the action ran
    #[error("no element matches {locator}")]
    TargetNotFound {
        /// Locator that resolved to nothing
        locator: Locator,
    },

    /// A condition kind that cannot be used in this position
    #[error("unsupported condition `{condition}`: {reason}")]
    UnsupportedCondition {
        /// Offending condition text
        condition: String,
        /// Why it is rejected
        reason: String,
    },

    /// Readiness gate did not pass before the aggregate deadline
    #[error("page `{page}` not ready after {}ms: {unmet} never held", elapsed.as_millis())]
    PageNotReady {
        /// Page name
        page: String,
        /// First check that was not satisfied
        unmet: String,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// The driver refused the mutating operation
    #[error("{operation} on {locator} failed: {source}")]
    ActionFailed {
        /// Target of the action
        locator: Locator,
        /// Operation name (click, clear, enter text)
        operation: String,
        /// Underlying driver error
        #[source]
        source: DriverError,
    },

    /// Element name not declared in the page definition
    #[error("page `{page}` has no element named `{name}`")]
    UnknownElement {
        /// Page name
        page: String,
        /// Requested element name
        name: String,
    },

    /// Wait timing violates `poll_interval < timeout`
    #[error("invalid wait spec: {message}")]
    InvalidWaitSpec {
        /// Error message
        message: String,
    },

    /// Page definition failed validation
    #[error("invalid page definition `{page}`: {message}")]
    InvalidPageDefinition {
        /// Page name (may be empty when the name itself is missing)
        page: String,
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Surface-level driver failure (navigation, url, title)
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewaitError {
    /// Create an invalid wait spec error
    #[must_use]
    pub fn invalid_wait_spec(message: impl Into<String>) -> Self {
        Self::InvalidWaitSpec {
            message: message.into(),
        }
    }

    /// Create an invalid page definition error
    #[must_use]
    pub fn invalid_page(page: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPageDefinition {
            page: page.into(),
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// True for failures caused by waiting out a deadline
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConditionTimeout { .. } | Self::PageNotReady { .. }
        )
    }
}
