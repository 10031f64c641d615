//! Data-driven page objects.
//!
//! A page is a table of named locators plus the readiness checks that
//! identify it, loaded from YAML:
//!
//! ```yaml
//! name: login
//! url: https://www.saucedemo.com/
//! title: Swag Labs
//! elements:
//!   username: { by: id, value: user-name }
//!   password: { by: id, value: password }
//!   login_button: { by: id, value: login-button }
//! ready:
//!   - element: username
//!   - element: login_button
//!     condition: clickable
//! ```
//!
//! [`Page`] binds a definition to a [`Session`] and hands out [`ElementRef`]s
//! carrying the probe/action vocabulary.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assertion::Expect;
use crate::condition::Condition;
use crate::dispatch::Dispatcher;
use crate::driver::Driver;
use crate::gate::{Check, PageState, ReadinessGate, UrlPattern};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::session::Session;
use crate::wait::{WaitReport, WaitSpec};

// =============================================================================
// DEFINITION
// =============================================================================

/// One readiness entry; exactly one of `element`, `title`, `url_equals`,
/// `url_contains` or `url_matches` is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadyEntry {
    /// Declared element name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Condition for `element` (default: visible)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Expected document title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Exact URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_equals: Option<String>,
    /// Fragment the URL must contain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_contains: Option<String>,
    /// Path pattern the URL must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_matches: Option<UrlPattern>,
}

impl ReadyEntry {
    /// Element entry with the default condition
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            element: Some(name.into()),
            ..Self::default()
        }
    }

    /// Element entry with an explicit condition
    #[must_use]
    pub fn element_with(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            element: Some(name.into()),
            condition: Some(condition),
            ..Self::default()
        }
    }

    fn kinds_set(&self) -> usize {
        [
            self.element.is_some(),
            self.title.is_some(),
            self.url_equals.is_some(),
            self.url_contains.is_some(),
            self.url_matches.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Declarative page description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDefinition {
    /// Page name
    pub name: String,
    /// URL opened by [`Page::open`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Expected document title; appended to the readiness checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Override of the session's load/action wait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitSpec>,
    /// Named locators
    #[serde(default)]
    pub elements: BTreeMap<String, Locator>,
    /// Readiness checks, in evaluation order
    #[serde(default)]
    pub ready: Vec<ReadyEntry>,
}

impl PageDefinition {
    /// Create an empty definition
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            title: None,
            wait: None,
            elements: BTreeMap::new(),
            ready: Vec::new(),
        }
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the expected title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Override the wait
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Declare a named element
    #[must_use]
    pub fn with_element(mut self, name: impl Into<String>, locator: Locator) -> Self {
        let _ = self.elements.insert(name.into(), locator);
        self
    }

    /// Append a readiness entry
    #[must_use]
    pub fn with_ready(mut self, entry: ReadyEntry) -> Self {
        self.ready.push(entry);
        self
    }

    /// Parse and validate a YAML definition
    pub fn from_yaml(yaml: &str) -> PagewaitResult<Self> {
        let definition: Self = serde_yaml_ng::from_str(yaml)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> PagewaitResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Check the definition is usable
    pub fn validate(&self) -> PagewaitResult<()> {
        let invalid = |message: String| PagewaitError::invalid_page(&self.name, message);

        if self.name.trim().is_empty() {
            return Err(invalid("page name is empty".to_string()));
        }

        for (name, locator) in &self.elements {
            if locator.selector().query().trim().is_empty() {
                return Err(invalid(format!("element `{name}` has an empty locator")));
            }
        }

        for (index, entry) in self.ready.iter().enumerate() {
            if entry.kinds_set() != 1 {
                return Err(invalid(format!(
                    "ready entry {index} must set exactly one of element, title, url_equals, url_contains, url_matches"
                )));
            }
            match &entry.element {
                Some(name) if !self.elements.contains_key(name) => {
                    return Err(invalid(format!(
                        "ready entry {index} names undeclared element `{name}`"
                    )));
                }
                None if entry.condition.is_some() => {
                    return Err(invalid(format!(
                        "ready entry {index} has a condition but no element"
                    )));
                }
                _ => {}
            }
        }

        if self.ready.is_empty() && self.title.is_none() {
            return Err(invalid("at least one readiness check is required".to_string()));
        }

        if let Some(wait) = &self.wait {
            wait.validate()
                .map_err(|err| invalid(format!("wait override: {err}")))?;
        }

        Ok(())
    }

    /// Locator for a declared element
    pub fn locator(&self, name: &str) -> PagewaitResult<&Locator> {
        self.elements
            .get(name)
            .ok_or_else(|| PagewaitError::UnknownElement {
                page: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Declared element names, sorted
    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Build the readiness gate.
    ///
    /// Entries keep their order; `title` is checked last unless an entry
    /// already checks it.
    pub fn gate(&self) -> PagewaitResult<ReadinessGate> {
        let mut gate = ReadinessGate::new(&self.name);
        for entry in &self.ready {
            let check = if let Some(name) = &entry.element {
                Check::Element {
                    locator: self.locator(name)?.clone(),
                    condition: entry.condition.clone().unwrap_or(Condition::Visible),
                }
            } else if let Some(title) = &entry.title {
                Check::Title(title.clone())
            } else if let Some(url) = &entry.url_equals {
                Check::UrlEquals(url.clone())
            } else if let Some(fragment) = &entry.url_contains {
                Check::UrlContains(fragment.clone())
            } else if let Some(pattern) = &entry.url_matches {
                Check::UrlMatches(pattern.clone())
            } else {
                return Err(PagewaitError::invalid_page(&self.name, "empty ready entry"));
            };
            gate = gate.with_check(check);
        }

        if let Some(title) = &self.title {
            let check = Check::Title(title.clone());
            if !gate.checks().contains(&check) {
                gate = gate.with_check(check);
            }
        }
        Ok(gate)
    }
}

// =============================================================================
// PAGE
// =============================================================================

/// A page definition bound to a session
#[derive(Debug)]
pub struct Page<'s, D> {
    session: &'s Session<D>,
    definition: PageDefinition,
    gate: ReadinessGate,
    state: PageState,
}

impl<'s, D: Driver> Page<'s, D> {
    /// Bind `definition` to `session`
    pub fn new(session: &'s Session<D>, definition: PageDefinition) -> PagewaitResult<Self> {
        definition.validate()?;
        let gate = definition.gate()?;
        Ok(Self {
            session,
            definition,
            gate,
            state: PageState::NotLoaded,
        })
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Underlying definition
    #[must_use]
    pub const fn definition(&self) -> &PageDefinition {
        &self.definition
    }

    /// Readiness gate built from the definition
    #[must_use]
    pub const fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> PageState {
        self.state
    }

    /// Wait used for loading and actions on this page
    #[must_use]
    pub fn wait_spec(&self) -> WaitSpec {
        self.definition.wait.unwrap_or(self.session.config().wait)
    }

    /// Navigate to the definition's URL, then wait for readiness
    pub fn open(&mut self) -> PagewaitResult<WaitReport> {
        let url = self.definition.url.as_deref().ok_or_else(|| {
            PagewaitError::invalid_page(&self.definition.name, "no url to open")
        })?;
        tracing::info!(page = %self.definition.name, url, "opening page");
        self.session.driver().navigate(url)?;
        self.wait_for_ready()
    }

    /// Block until every readiness check holds within one shared deadline
    pub fn wait_for_ready(&mut self) -> PagewaitResult<WaitReport> {
        let result = self.gate.wait_for_ready(self.session, &self.wait_spec());
        self.state = self.state.on_load(result.is_ok());
        result
    }

    /// Single-pass readiness check; never fails
    pub fn is_displaying(&mut self) -> bool {
        let displaying = self.gate.is_displaying(self.session);
        let next = self.state.on_check(displaying);
        if next != self.state {
            tracing::warn!(page = %self.definition.name, from = %self.state, to = %next, "page state changed");
        }
        self.state = next;
        displaying
    }

    /// Document title, or `""`
    pub fn title(&self) -> String {
        self.session.driver().title().unwrap_or_default()
    }

    /// Current URL, or `""`
    pub fn current_url(&self) -> String {
        self.session.driver().current_url().unwrap_or_default()
    }

    /// Handle to a declared element
    pub fn element(&self, name: &str) -> PagewaitResult<ElementRef<'_, D>> {
        let locator = self.definition.locator(name)?;
        Ok(ElementRef {
            dispatcher: self.dispatcher(),
            name: name.to_string(),
            locator,
        })
    }

    /// Dispatcher using this page's wait
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<'s, D> {
        self.session.dispatcher().with_wait(self.wait_spec())
    }

    /// Failing assertions against this page's session
    #[must_use]
    pub fn expect(&self) -> Expect<'s, D> {
        Expect::new(self.session).with_wait(self.wait_spec())
    }
}

// =============================================================================
// ELEMENT REF
// =============================================================================

/// A named element of a page with the probe/action vocabulary
#[derive(Debug)]
pub struct ElementRef<'p, D> {
    dispatcher: Dispatcher<'p, D>,
    name: String,
    locator: &'p Locator,
}

impl<D: Driver> ElementRef<'_, D> {
    /// Element name in the page definition
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locator behind this element
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        self.locator
    }

    /// Replace the contents with `text`
    pub fn enter_text(&self, text: &str) -> PagewaitResult<()> {
        self.dispatcher.enter_text(self.locator, text)
    }

    /// Clear the contents
    pub fn clear(&self) -> PagewaitResult<()> {
        self.dispatcher.clear(self.locator)
    }

    /// Click
    pub fn click(&self) -> PagewaitResult<()> {
        self.dispatcher.click(self.locator)
    }

    /// Wait for `condition`, failing on timeout
    pub fn wait_until(&self, condition: &Condition) -> PagewaitResult<WaitReport> {
        self.dispatcher.wait_for(self.locator, condition)
    }

    /// Wait for the element to be hidden or gone
    pub fn wait_until_gone(&self) -> PagewaitResult<WaitReport> {
        self.wait_until(&Condition::Invisible)
    }

    /// Is displayed
    pub fn is_displayed(&self) -> bool {
        self.dispatcher.is_visible(self.locator)
    }

    /// Is enabled
    pub fn is_enabled(&self) -> bool {
        self.dispatcher.is_enabled(self.locator)
    }

    /// Is displayed and enabled
    pub fn is_clickable(&self) -> bool {
        self.dispatcher.is_clickable(self.locator)
    }

    /// Is marked required
    pub fn is_required(&self) -> bool {
        self.dispatcher.is_required(self.locator)
    }

    /// Input value, or `""`
    pub fn value(&self) -> String {
        self.dispatcher.value(self.locator)
    }

    /// Trimmed text, or `""`
    pub fn text(&self) -> String {
        self.dispatcher.text(self.locator)
    }

    /// Attribute value, or `""`
    pub fn attribute(&self, name: &str) -> String {
        self.dispatcher.attribute(self.locator, name)
    }

    /// Does the input already hold `expected`
    pub fn is_prepopulated_with(&self, expected: &str) -> bool {
        self.value() == expected
    }

    /// Does the text contain `fragment`
    pub fn text_contains(&self, fragment: &str) -> bool {
        self.dispatcher.contains_text(self.locator, fragment)
    }

    /// Wait for visibility and read the text, failing on timeout
    pub fn fetch_text(&self) -> PagewaitResult<String> {
        self.dispatcher.fetch_text(self.locator)
    }

    /// Wait for visibility and read the value, failing on timeout
    pub fn fetch_value(&self) -> PagewaitResult<String> {
        self.dispatcher.fetch_value(self.locator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::locator::Selector;
    use crate::mock::{MockNode, MockSurface};
    use std::sync::Arc;
    use std::time::Duration;

    const LOGIN_YAML: &str = r#"
name: login
url: https://www.saucedemo.com/
title: Swag Labs
wait:
  timeout_ms: 2000
  poll_interval_ms: 200
elements:
  username: { by: id, value: user-name }
  password: { by: id, value: password }
  login_button: { by: id, value: login-button }
  error: { by: css, value: "h3[data-test='error']" }
ready:
  - element: username
  - element: password
  - element: login_button
    condition: clickable
"#;

    mod definition_tests {
        use super::*;

        #[test]
        fn test_from_yaml() {
            let def = PageDefinition::from_yaml(LOGIN_YAML).unwrap();
            assert_eq!(def.name, "login");
            assert_eq!(def.wait, Some(WaitSpec::new(2000, 200)));
            assert_eq!(def.locator("username").unwrap(), &Locator::id("user-name"));
            assert_eq!(
                def.element_names().collect::<Vec<_>>(),
                vec!["error", "login_button", "password", "username"]
            );
        }

        #[test]
        fn test_gate_order_and_title() {
            let gate = PageDefinition::from_yaml(LOGIN_YAML).unwrap().gate().unwrap();
            let checks: Vec<String> = gate.checks().iter().map(ToString::to_string).collect();
            assert_eq!(
                checks,
                vec![
                    "id=user-name visible",
                    "id=password visible",
                    "id=login-button clickable",
                    "title equal to \"Swag Labs\"",
                ]
            );
        }

        #[test]
        fn test_explicit_title_entry_not_duplicated() {
            let def = PageDefinition::new("inventory")
                .with_title("Swag Labs")
                .with_ready(ReadyEntry {
                    title: Some("Swag Labs".into()),
                    ..ReadyEntry::default()
                });
            assert_eq!(def.gate().unwrap().checks().len(), 1);
        }

        #[test]
        fn test_url_equals_entry() {
            let yaml = "name: cart\nready:\n  - url_equals: https://www.saucedemo.com/cart.html\n";
            let gate = PageDefinition::from_yaml(yaml).unwrap().gate().unwrap();
            assert_eq!(
                gate.checks(),
                &[Check::UrlEquals("https://www.saucedemo.com/cart.html".to_string())]
            );
        }

        #[test]
        fn test_undeclared_element_rejected() {
            let yaml = "name: p\nelements:\n  a: { by: id, value: a }\nready:\n  - element: b\n";
            let err = PageDefinition::from_yaml(yaml).unwrap_err();
            assert!(err.to_string().contains("undeclared element `b`"));
        }

        #[test]
        fn test_no_checks_rejected() {
            let err = PageDefinition::new("empty").validate().unwrap_err();
            assert!(matches!(err, PagewaitError::InvalidPageDefinition { .. }));
        }

        #[test]
        fn test_ambiguous_entry_rejected() {
            let def = PageDefinition::new("p")
                .with_element("a", Locator::id("a"))
                .with_ready(ReadyEntry {
                    element: Some("a".into()),
                    url_contains: Some("x".into()),
                    ..ReadyEntry::default()
                });
            assert!(def.validate().is_err());
        }

        #[test]
        fn test_condition_without_element_rejected() {
            let def = PageDefinition::new("p").with_ready(ReadyEntry {
                url_contains: Some("x".into()),
                condition: Some(Condition::Visible),
                ..ReadyEntry::default()
            });
            assert!(def.validate().is_err());
        }

        #[test]
        fn test_bad_wait_override_rejected() {
            let def = PageDefinition::new("p")
                .with_title("t")
                .with_wait(WaitSpec::new(100, 200));
            let err = def.validate().unwrap_err();
            assert!(err.to_string().contains("wait override"));
        }

        #[test]
        fn test_empty_locator_rejected() {
            let def = PageDefinition::new("p")
                .with_title("t")
                .with_element("blank", Locator::from_selector(Selector::css("  ")));
            assert!(def.validate().is_err());
        }

        #[test]
        fn test_unknown_condition_in_yaml() {
            let yaml = "name: p\nelements:\n  a: { by: id, value: a }\nready:\n  - element: a\n    condition: hovered\n";
            assert!(PageDefinition::from_yaml(yaml).is_err());
        }

        #[test]
        fn test_unknown_field_rejected() {
            let yaml = "name: p\ntitle: t\nurl_pattern: /x\n";
            assert!(PageDefinition::from_yaml(yaml).is_err());
        }

        #[test]
        fn test_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("login.yaml");
            std::fs::write(&path, LOGIN_YAML).unwrap();
            let def = PageDefinition::from_file(&path).unwrap();
            assert_eq!(def.url.as_deref(), Some("https://www.saucedemo.com/"));

            let missing = PageDefinition::from_file(dir.path().join("nope.yaml")).unwrap_err();
            assert!(matches!(missing, PagewaitError::Io(_)));
        }
    }

    mod page_tests {
        use super::*;

        fn login_surface(clock: Arc<ManualClock>) -> MockSurface {
            MockSurface::new(clock)
                .with_route("https://www.saucedemo.com/", "Swag Labs")
                .with_node(MockNode::input(Locator::id("user-name")).attribute("required", ""))
                .with_node(MockNode::input(Locator::id("password")))
                .with_node(MockNode::new(Locator::id("login-button")).text("Login"))
        }

        fn session() -> (Arc<ManualClock>, Session<MockSurface>) {
            let clock = Arc::new(ManualClock::new());
            let session = Session::new(login_surface(clock.clone())).with_clock(clock.clone());
            (clock, session)
        }

        #[test]
        fn test_open_navigates_and_loads() {
            let (_clock, session) = session();
            let mut page = Page::new(&session, PageDefinition::from_yaml(LOGIN_YAML).unwrap()).unwrap();
            assert_eq!(page.state(), PageState::NotLoaded);

            page.open().unwrap();
            assert_eq!(page.state(), PageState::Loaded);
            assert_eq!(page.title(), "Swag Labs");
            assert_eq!(page.current_url(), "https://www.saucedemo.com/");
            assert_eq!(session.driver().navigations(), vec!["https://www.saucedemo.com/".to_string()]);
        }

        #[test]
        fn test_open_without_url() {
            let (_clock, session) = session();
            let mut page = Page::new(&session, PageDefinition::new("p").with_title("x")).unwrap();
            assert!(matches!(
                page.open(),
                Err(PagewaitError::InvalidPageDefinition { .. })
            ));
        }

        #[test]
        fn test_load_failure_uses_page_wait() {
            let (clock, session) = session();
            let def = PageDefinition::from_yaml(LOGIN_YAML)
                .unwrap()
                .with_title("Products");
            let mut page = Page::new(&session, def).unwrap();
            session.driver().navigate("https://www.saucedemo.com/").unwrap();

            let err = page.wait_for_ready().unwrap_err();
            assert!(matches!(err, PagewaitError::PageNotReady { .. }));
            assert_eq!(page.state(), PageState::NotLoaded);
            assert_eq!(clock.now(), Duration::from_secs(2));
        }

        #[test]
        fn test_degrades_when_controls_disappear() {
            let (_clock, session) = session();
            let mut page = Page::new(&session, PageDefinition::from_yaml(LOGIN_YAML).unwrap()).unwrap();
            page.open().unwrap();
            assert!(page.is_displaying());

            session.driver().remove(&Locator::id("password"));
            assert!(!page.is_displaying());
            assert_eq!(page.state(), PageState::Degraded);
        }

        #[test]
        fn test_element_vocabulary() {
            let (_clock, session) = session();
            let page = Page::new(&session, PageDefinition::from_yaml(LOGIN_YAML).unwrap()).unwrap();

            let username = page.element("username").unwrap();
            assert!(username.is_displayed());
            assert!(username.is_enabled());
            assert!(username.is_required());
            assert!(!page.element("password").unwrap().is_required());

            username.enter_text("standard_user").unwrap();
            assert!(username.is_prepopulated_with("standard_user"));
            username.clear().unwrap();
            assert_eq!(username.value(), "");

            let button = page.element("login_button").unwrap();
            assert!(button.text_contains("Log"));
            assert_eq!(button.fetch_text().unwrap(), "Login");
            button.click().unwrap();
            assert_eq!(session.driver().click_count(&Locator::id("login-button")), 1);

            let error = page.element("error").unwrap();
            assert!(!error.is_displayed());
            assert_eq!(error.text(), "");
            assert!(error.wait_until_gone().is_ok());
        }

        #[test]
        fn test_unknown_element() {
            let (_clock, session) = session();
            let page = Page::new(&session, PageDefinition::from_yaml(LOGIN_YAML).unwrap()).unwrap();
            match page.element("checkout") {
                Err(PagewaitError::UnknownElement { page, name }) => {
                    assert_eq!(page, "login");
                    assert_eq!(name, "checkout");
                }
                other => panic!("expected UnknownElement, got {other:?}"),
            }
        }

        #[test]
        fn test_action_timeout_respects_page_wait() {
            let (clock, session) = session();
            let page = Page::new(&session, PageDefinition::from_yaml(LOGIN_YAML).unwrap()).unwrap();
            assert!(page.element("error").unwrap().click().is_err());
            assert_eq!(clock.now(), Duration::from_secs(2));
        }
    }
}
