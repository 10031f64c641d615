//! Probe/action dispatcher.
//!
//! Two calling conventions over the poller:
//!
//! - **Probes** answer state questions ("is X displayed", "what does X say").
//!   They never return an error; any failure degrades to `false` or `""`, so
//!   the caller's assertion decides whether absence matters.
//! - **Actions** mutate the page (click, clear, enter text). They first wait
//!   for a precondition, then re-resolve the target and act on it. A
//!   precondition that never holds is a [`PagewaitError::ConditionTimeout`]
//!   naming the locator.
//!
//! Each call performs exactly one bounded wait. Retrying at a higher level is
//! the caller's business.

use std::fmt;

use crate::condition::Condition;
use crate::driver::{Driver, DriverResult, Element};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::session::Session;
use crate::wait::{WaitReport, WaitSpec};

/// Mutating operation performed by an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Click the target
    Click,
    /// Clear an editable target
    Clear,
    /// Replace the target's contents: clear, then type
    EnterText(String),
}

impl Operation {
    /// Operation name used in errors and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Clear => "clear",
            Self::EnterText(_) => "enter text",
        }
    }

    /// Precondition used when the caller does not give one
    #[must_use]
    pub const fn default_precondition(&self) -> Condition {
        match self {
            Self::Click | Self::EnterText(_) => Condition::Clickable,
            Self::Clear => Condition::Visible,
        }
    }

    fn apply<E: Element>(&self, element: &E) -> DriverResult<()> {
        match self {
            Self::Click => element.click(),
            Self::Clear => element.clear(),
            Self::EnterText(text) => {
                element.clear()?;
                element.type_text(text)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a read probe extracts from its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Getter {
    /// Trimmed visible text
    Text,
    /// Current `value` of an input
    Value,
    /// Named attribute
    Attribute(String),
}

impl Getter {
    fn get<E: Element>(&self, element: &E) -> DriverResult<Option<String>> {
        match self {
            Self::Text => element.text().map(|text| Some(text.trim().to_string())),
            Self::Value => element.attribute("value"),
            Self::Attribute(name) => element.attribute(name),
        }
    }
}

/// Outcome of a read probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    /// Whether the target resolved
    pub found: bool,
    /// Value read, if any
    pub value: Option<String>,
}

impl ProbeResult {
    /// Target did not resolve
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            found: false,
            value: None,
        }
    }

    /// Target resolved with `value`
    #[must_use]
    pub const fn found(value: Option<String>) -> Self {
        Self { found: true, value }
    }

    /// Borrow the value, or `""`
    #[must_use]
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Take the value, or `""`
    #[must_use]
    pub fn into_value_or_empty(self) -> String {
        self.value.unwrap_or_default()
    }
}

/// Probe and action entry point bound to a session
#[derive(Debug, Clone)]
pub struct Dispatcher<'s, D> {
    session: &'s Session<D>,
    wait: WaitSpec,
    probe_wait: WaitSpec,
}

impl<'s, D: Driver> Dispatcher<'s, D> {
    /// Create a dispatcher using the session's default waits
    #[must_use]
    pub fn new(session: &'s Session<D>) -> Self {
        let config = session.config();
        Self {
            session,
            wait: config.wait,
            probe_wait: config.probe_wait,
        }
    }

    /// Override the action wait
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    /// Override the probe wait
    #[must_use]
    pub const fn with_probe_wait(mut self, probe_wait: WaitSpec) -> Self {
        self.probe_wait = probe_wait;
        self
    }

    /// Action wait
    #[must_use]
    pub const fn wait_spec(&self) -> WaitSpec {
        self.wait
    }

    /// Probe wait
    #[must_use]
    pub const fn probe_spec(&self) -> WaitSpec {
        self.probe_wait
    }

    /// Session this dispatcher drives
    #[must_use]
    pub const fn session(&self) -> &'s Session<D> {
        self.session
    }

    // =========================================================================
    // Probes
    // =========================================================================

    /// Does `locator` satisfy `condition` within the probe wait
    pub fn probe(&self, locator: &Locator, condition: &Condition) -> bool {
        self.probe_within(locator, condition, &self.probe_wait)
    }

    /// Does `locator` satisfy `condition` within `spec`.
    ///
    /// Timeouts, absent targets and invalid specs all read as `false`.
    pub fn probe_within(&self, locator: &Locator, condition: &Condition, spec: &WaitSpec) -> bool {
        match self.session.poller().wait_for(locator, condition, spec) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(%locator, %err, "probe degraded to false");
                false
            }
        }
    }

    /// Read a value from `locator`; absent or failing targets give
    /// [`ProbeResult::absent`].
    ///
    /// Text is only read from visible targets; a hidden node has no text.
    pub fn read(&self, locator: &Locator, getter: &Getter) -> ProbeResult {
        let readable = match getter {
            Getter::Text => Condition::Visible,
            Getter::Value | Getter::Attribute(_) => Condition::Present,
        };
        if !self.probe(locator, &readable) {
            return ProbeResult::absent();
        }
        let element = match self.session.driver().find_one(locator) {
            Ok(Some(element)) => element,
            Ok(None) | Err(_) => return ProbeResult::absent(),
        };
        match getter.get(&element) {
            Ok(value) => ProbeResult::found(value),
            Err(err) => {
                tracing::debug!(%locator, %err, "read degraded to empty");
                ProbeResult::absent()
            }
        }
    }

    /// Is the target displayed
    pub fn is_visible(&self, locator: &Locator) -> bool {
        self.probe(locator, &Condition::Visible)
    }

    /// Is the target enabled
    pub fn is_enabled(&self, locator: &Locator) -> bool {
        self.probe(locator, &Condition::Enabled)
    }

    /// Is the target visible and enabled
    pub fn is_clickable(&self, locator: &Locator) -> bool {
        self.probe(locator, &Condition::Clickable)
    }

    /// Does the target's text contain `text`
    pub fn contains_text(&self, locator: &Locator, text: &str) -> bool {
        self.probe(locator, &Condition::text_contains(text))
    }

    /// Does the target carry attribute `name`
    pub fn has_attribute(&self, locator: &Locator, name: &str) -> bool {
        self.probe(locator, &Condition::attribute_present(name))
    }

    /// Trimmed text, or `""`
    pub fn text(&self, locator: &Locator) -> String {
        self.read(locator, &Getter::Text).into_value_or_empty()
    }

    /// Input value, or `""`
    pub fn value(&self, locator: &Locator) -> String {
        self.read(locator, &Getter::Value).into_value_or_empty()
    }

    /// Attribute value, or `""`
    pub fn attribute(&self, locator: &Locator, name: &str) -> String {
        self.read(locator, &Getter::Attribute(name.to_string()))
            .into_value_or_empty()
    }

    /// Is the field marked required.
    ///
    /// `required` present with any value except `"false"`, or
    /// `aria-required="true"`.
    pub fn is_required(&self, locator: &Locator) -> bool {
        let required = self.read(locator, &Getter::Attribute("required".to_string()));
        if !required.found {
            return false;
        }
        if required
            .value
            .as_deref()
            .is_some_and(|value| !value.trim().eq_ignore_ascii_case("false"))
        {
            return true;
        }
        self.attribute(locator, "aria-required")
            .trim()
            .eq_ignore_ascii_case("true")
    }

    /// Number of nodes matching `locator`, or 0
    pub fn count(&self, locator: &Locator) -> usize {
        self.session
            .driver()
            .find_all(locator)
            .map(|found| found.len())
            .unwrap_or(0)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Wait for `precondition`, then perform `operation` on the target.
    ///
    /// Absence preconditions are rejected before any waiting: there is
    /// nothing to act on once the target is gone.
    pub fn act(
        &self,
        locator: &Locator,
        operation: &Operation,
        precondition: &Condition,
    ) -> PagewaitResult<()> {
        if precondition.accepts_absence() {
            return Err(PagewaitError::UnsupportedCondition {
                condition: precondition.to_string(),
                reason: format!("cannot {operation} a target that is expected to be gone"),
            });
        }

        self.session
            .poller()
            .wait_for(locator, precondition, &self.wait)
            .map_err(|err| {
                tracing::warn!(%locator, %operation, %err, "action precondition failed");
                err
            })?;

        let element = match self.session.driver().find_one(locator) {
            Ok(Some(element)) => element,
            Ok(None) | Err(_) => {
                tracing::warn!(%locator, %operation, "target vanished before action");
                return Err(PagewaitError::TargetNotFound {
                    locator: locator.clone(),
                });
            }
        };

        operation.apply(&element).map_err(|source| {
            tracing::warn!(%locator, %operation, %source, "action rejected by driver");
            PagewaitError::ActionFailed {
                locator: locator.clone(),
                operation: operation.name().to_string(),
                source,
            }
        })?;

        tracing::debug!(%locator, %operation, "action done");
        Ok(())
    }

    /// Click once clickable
    pub fn click(&self, locator: &Locator) -> PagewaitResult<()> {
        let operation = Operation::Click;
        self.act(locator, &operation, &operation.default_precondition())
    }

    /// Clear once visible
    pub fn clear(&self, locator: &Locator) -> PagewaitResult<()> {
        let operation = Operation::Clear;
        self.act(locator, &operation, &operation.default_precondition())
    }

    /// Replace the field contents with `text` once clickable
    pub fn enter_text(&self, locator: &Locator, text: &str) -> PagewaitResult<()> {
        let operation = Operation::EnterText(text.to_string());
        self.act(locator, &operation, &operation.default_precondition())
    }

    /// Wait for `condition` within the action wait, failing on timeout
    pub fn wait_for(&self, locator: &Locator, condition: &Condition) -> PagewaitResult<WaitReport> {
        self.session.poller().wait_for(locator, condition, &self.wait)
    }

    /// Wait for visibility, then read trimmed text; failures propagate
    pub fn fetch_text(&self, locator: &Locator) -> PagewaitResult<String> {
        self.fetch(locator, &Getter::Text)
    }

    /// Wait for visibility, then read the input value; failures propagate
    pub fn fetch_value(&self, locator: &Locator) -> PagewaitResult<String> {
        self.fetch(locator, &Getter::Value)
    }

    fn fetch(&self, locator: &Locator, getter: &Getter) -> PagewaitResult<String> {
        self.wait_for(locator, &Condition::Visible)?;
        let element = self
            .session
            .driver()
            .find_one(locator)
            .ok()
            .flatten()
            .ok_or_else(|| PagewaitError::TargetNotFound {
                locator: locator.clone(),
            })?;
        Ok(getter.get(&element)?.unwrap_or_default())
    }
}
