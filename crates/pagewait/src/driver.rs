//! Browser driver abstraction.
//!
//! The wait/verify layer never talks to a browser directly. It consumes the
//! small capability set below, which a WebDriver, CDP or in-memory adapter
//! implements. Element handles are short-lived: callers resolve a
//! [`Locator`] for every probe or action and drop the handle afterwards.

use crate::locator::Locator;
use thiserror::Error;

/// Result type for driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures reported by a driver adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Lookup failed outright (as opposed to matching nothing)
    #[error("no such element: {locator}")]
    NoSuchElement {
        /// Locator that failed
        locator: String,
    },

    /// Handle refers to a node that has left the rendered surface
    #[error("stale element reference")]
    StaleElement,

    /// Node exists but refused the interaction
    #[error("element not interactable: {message}")]
    NotInteractable {
        /// Error message
        message: String,
    },

    /// Browser session is unusable
    #[error("session error: {message}")]
    Session {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Create a not-interactable error
    #[must_use]
    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::NotInteractable {
            message: message.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }
}

/// A resolved UI node
pub trait Element {
    /// Is the node rendered and visible
    fn is_visible(&self) -> DriverResult<bool>;

    /// Is the node enabled for input
    fn is_enabled(&self) -> DriverResult<bool>;

    /// Visible text content
    fn text(&self) -> DriverResult<String>;

    /// Attribute (or live property, for `value`); `None` when absent
    fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Click the node
    fn click(&self) -> DriverResult<()>;

    /// Clear an editable node
    fn clear(&self) -> DriverResult<()>;

    /// Send keystrokes; appends to the current value
    fn type_text(&self, text: &str) -> DriverResult<()>;
}

/// The rendered surface (one browser session)
pub trait Driver {
    /// Handle type returned by lookups
    type Element: Element;

    /// First node matching `locator`, if any
    fn find_one(&self, locator: &Locator) -> DriverResult<Option<Self::Element>>;

    /// All nodes matching `locator`
    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<Self::Element>>;

    /// URL of the current document
    fn current_url(&self) -> DriverResult<String>;

    /// Title of the current document
    fn title(&self) -> DriverResult<String>;

    /// Load `url` in the current session
    fn navigate(&self, url: &str) -> DriverResult<()>;
}
