//! Readiness gate: the aggregate check set that says "this page is showing".
//!
//! A gate is used two ways:
//!
//! - [`ReadinessGate::wait_for_ready`] blocks until every check holds. All
//!   checks share one deadline, so a gate with five checks waits at most one
//!   timeout in total, never five.
//! - [`ReadinessGate::is_displaying`] makes a single pass with no retrying and
//!   returns a plain boolean.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::{evaluate, Condition};
use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::session::Session;
use crate::wait::{WaitReport, WaitSpec};

// =============================================================================
// URL PATTERNS
// =============================================================================

/// Path pattern matched against the current URL.
///
/// Patterns support:
/// - Literal segments: `/inventory.html`
/// - Wildcards: `/users/*`
/// - Named parameters: `/users/:id`
///
/// Scheme, host, query and fragment are ignored when matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UrlPattern {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlPattern {
    /// Parse a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL's path matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = split_path(path_of(url)).collect();

        // wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit.as_str() == *actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract named parameters from a matching URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if !self.matches(url) {
            return params;
        }

        for (segment, value) in self.segments.iter().zip(split_path(path_of(url))) {
            if let UrlSegment::Parameter(name) = segment {
                let _ = params.insert(name.clone(), value.to_string());
            }
        }
        params
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl From<String> for UrlPattern {
    fn from(pattern: String) -> Self {
        Self::new(&pattern)
    }
}

impl From<UrlPattern> for String {
    fn from(pattern: UrlPattern) -> Self {
        pattern.pattern
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Path component of `url`, without scheme, host, query or fragment
fn path_of(url: &str) -> &str {
    let url = url.split(['?', '#']).next().unwrap_or_default();
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |at| &rest[at..]),
        None => url,
    }
}

// =============================================================================
// CHECKS
// =============================================================================

/// One condition in a readiness gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// A located node satisfies a condition
    Element {
        /// Target
        locator: Locator,
        /// Condition it must satisfy
        condition: Condition,
    },
    /// Document title equals this value
    Title(String),
    /// Current URL equals this value
    UrlEquals(String),
    /// Current URL contains this fragment
    UrlContains(String),
    /// Current URL path matches this pattern
    UrlMatches(UrlPattern),
}

impl Check {
    /// Evaluate once against the session's surface; never fails
    pub fn is_satisfied<D: Driver>(&self, session: &Session<D>) -> bool {
        let driver = session.driver();
        match self {
            Self::Element { locator, condition } => {
                evaluate(driver, locator, condition).is_met_for(condition)
            }
            Self::Title(expected) => driver.title().is_ok_and(|title| title.trim() == expected.trim()),
            Self::UrlEquals(expected) => driver.current_url().is_ok_and(|url| url == *expected),
            Self::UrlContains(fragment) => driver
                .current_url()
                .is_ok_and(|url| url.contains(fragment.as_str())),
            Self::UrlMatches(pattern) => driver.current_url().is_ok_and(|url| pattern.matches(&url)),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { locator, condition } => write!(f, "{locator} {}", condition.describe()),
            Self::Title(title) => write!(f, "title equal to {title:?}"),
            Self::UrlEquals(url) => write!(f, "url equal to {url:?}"),
            Self::UrlContains(fragment) => write!(f, "url containing {fragment:?}"),
            Self::UrlMatches(pattern) => write!(f, "url matching `{pattern}`"),
        }
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Ordered set of checks that together identify a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessGate {
    name: String,
    checks: Vec<Check>,
}

impl ReadinessGate {
    /// Create an empty gate for page `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    /// Append a check
    #[must_use]
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Require `locator` to satisfy `condition`
    #[must_use]
    pub fn with_element(self, locator: Locator, condition: Condition) -> Self {
        self.with_check(Check::Element { locator, condition })
    }

    /// Require `locator` to be visible
    #[must_use]
    pub fn with_visible(self, locator: Locator) -> Self {
        self.with_element(locator, Condition::Visible)
    }

    /// Require the document title
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with_check(Check::Title(title.into()))
    }

    /// Require the URL to equal `url`
    #[must_use]
    pub fn with_url_equals(self, url: impl Into<String>) -> Self {
        self.with_check(Check::UrlEquals(url.into()))
    }

    /// Require the URL to contain `fragment`
    #[must_use]
    pub fn with_url_contains(self, fragment: impl Into<String>) -> Self {
        self.with_check(Check::UrlContains(fragment.into()))
    }

    /// Require the URL path to match `pattern`
    #[must_use]
    pub fn with_url_matches(self, pattern: &str) -> Self {
        self.with_check(Check::UrlMatches(UrlPattern::new(pattern)))
    }

    /// Page name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks in evaluation order
    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Block until every check holds, sharing one deadline across all of them.
    ///
    /// Fails with [`PagewaitError::PageNotReady`] naming the first check that
    /// did not hold in time.
    pub fn wait_for_ready<D: Driver>(
        &self,
        session: &Session<D>,
        spec: &WaitSpec,
    ) -> PagewaitResult<WaitReport> {
        spec.validate()?;
        let poller = session.poller();
        let deadline = poller.deadline(spec);
        let started = session.clock().now();
        let mut polls: u32 = 0;

        tracing::debug!(page = %self.name, checks = self.checks.len(), "waiting for page");

        for check in &self.checks {
            let waited_for = check.to_string();
            let report = poller.poll(spec.poll_interval(), deadline, &waited_for, || {
                check.is_satisfied(session)
            });
            polls = polls.saturating_add(report.polls);

            if !report.success {
                let elapsed = deadline.elapsed(session.clock().now());
                tracing::warn!(page = %self.name, unmet = %waited_for, "page not ready");
                return Err(PagewaitError::PageNotReady {
                    page: self.name.clone(),
                    unmet: waited_for,
                    elapsed,
                });
            }
        }

        let elapsed = session.clock().now().saturating_sub(started);
        tracing::debug!(page = %self.name, elapsed_ms = %elapsed.as_millis(), "page ready");
        Ok(WaitReport::success(elapsed, polls, self.name.clone()))
    }

    /// Single pass over every check; true only if all hold right now
    pub fn is_displaying<D: Driver>(&self, session: &Session<D>) -> bool {
        let displaying = self.checks.iter().all(|check| check.is_satisfied(session));
        tracing::debug!(page = %self.name, displaying, "readiness check");
        displaying
    }

    /// Names of checks not holding right now, in order
    pub fn unmet<D: Driver>(&self, session: &Session<D>) -> Vec<String> {
        self.checks
            .iter()
            .filter(|check| !check.is_satisfied(session))
            .map(ToString::to_string)
            .collect()
    }
}

// =============================================================================
// PAGE STATE
// =============================================================================

/// Lifecycle of a page object.
///
/// `NotLoaded -> Loaded` when a load wait succeeds; `Loaded -> Degraded` when a
/// later readiness check fails. Nothing leaves `Degraded` except another
/// successful load wait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageState {
    /// No load wait has succeeded yet
    #[default]
    NotLoaded,
    /// Load wait succeeded and no check has failed since
    Loaded,
    /// A readiness check failed after loading
    Degraded,
}

impl PageState {
    /// State after a load wait
    #[must_use]
    pub const fn on_load(self, ready: bool) -> Self {
        if ready {
            Self::Loaded
        } else {
            self
        }
    }

    /// State after a point-in-time readiness check
    #[must_use]
    pub const fn on_check(self, displaying: bool) -> Self {
        match (self, displaying) {
            (Self::Loaded, false) => Self::Degraded,
            (state, _) => state,
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => f.write_str("not loaded"),
            Self::Loaded => f.write_str("loaded"),
            Self::Degraded => f.write_str("degraded"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::mock::{MockNode, MockSurface};
    use std::sync::Arc;
    use std::time::Duration;

    const SPEC: WaitSpec = WaitSpec::new(2000, 200);

    fn login_session(surface: impl FnOnce(MockSurface) -> MockSurface) -> (Arc<ManualClock>, Session<MockSurface>) {
        let clock = Arc::new(ManualClock::new());
        let surface = surface(
            MockSurface::new(clock.clone())
                .with_url("https://www.saucedemo.com/")
                .with_title("Swag Labs"),
        );
        (clock.clone(), Session::new(surface).with_clock(clock))
    }

    fn login_gate() -> ReadinessGate {
        ReadinessGate::new("login")
            .with_visible(Locator::id("user-name"))
            .with_visible(Locator::id("password"))
            .with_visible(Locator::id("login-button"))
            .with_title("Swag Labs")
    }

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_literal_match_ignores_host_and_query() {
            let pattern = UrlPattern::new("/inventory.html");
            assert!(pattern.matches("https://www.saucedemo.com/inventory.html"));
            assert!(pattern.matches("https://www.saucedemo.com/inventory.html?sort=az#top"));
            assert!(pattern.matches("/inventory.html"));
            assert!(!pattern.matches("https://www.saucedemo.com/cart.html"));
        }

        #[test]
        fn test_root() {
            let pattern = UrlPattern::new("/");
            assert!(pattern.matches("https://www.saucedemo.com"));
            assert!(pattern.matches("https://www.saucedemo.com/"));
            assert!(!pattern.matches("https://www.saucedemo.com/cart.html"));
        }

        #[test]
        fn test_wildcard_and_parameter() {
            let pattern = UrlPattern::new("/users/*/posts/:post_id");
            assert!(pattern.matches("https://app.test/users/7/posts/100"));
            assert!(!pattern.matches("https://app.test/users/7/posts"));

            let params = pattern.extract_params("https://app.test/users/7/posts/100");
            assert_eq!(params.get("post_id").map(String::as_str), Some("100"));
            assert!(pattern.extract_params("https://app.test/other").is_empty());
        }

        #[test]
        fn test_yaml_string_form() {
            let pattern: UrlPattern = serde_yaml_ng::from_str("/item/:id").unwrap();
            assert_eq!(pattern.pattern(), "/item/:id");
        }
    }

    mod wait_for_ready_tests {
        use super::*;

        #[test]
        fn test_ready_page() {
            let (clock, session) = login_session(|s| {
                s.with_node(MockNode::input(Locator::id("user-name")))
                    .with_node(MockNode::input(Locator::id("password")))
                    .with_node(MockNode::new(Locator::id("login-button")))
            });
            let report = login_gate().wait_for_ready(&session, &SPEC).unwrap();
            assert!(report.success);
            assert_eq!(report.polls, 4);
            assert_eq!(clock.sleep_count(), 0);
        }

        #[test]
        fn test_late_control_succeeds_within_budget() {
            let (clock, session) = login_session(|s| {
                s.with_node(
                    MockNode::input(Locator::id("user-name"))
                        .appears_after(Duration::from_millis(1500)),
                )
                .with_node(MockNode::input(Locator::id("password")))
                .with_node(MockNode::new(Locator::id("login-button")))
            });
            let report = login_gate().wait_for_ready(&session, &SPEC).unwrap();
            assert_eq!(report.elapsed, Duration::from_millis(1600));
            assert_eq!(clock.now(), Duration::from_millis(1600));
        }

        #[test]
        fn test_aggregate_budget_is_shared() {
            // every control arrives late; waiting per check would need 3 x 1.5s
            let late = Duration::from_millis(1500);
            let (clock, session) = login_session(|s| {
                s.with_node(MockNode::input(Locator::id("user-name")).appears_after(late))
                    .with_node(MockNode::input(Locator::id("password")).appears_after(late))
                    .with_node(MockNode::new(Locator::id("login-button")).appears_after(late))
            });
            login_gate().wait_for_ready(&session, &SPEC).unwrap();
            assert_eq!(clock.now(), Duration::from_millis(1600));
        }

        #[test]
        fn test_missing_control_names_first_unmet_check() {
            let (clock, session) = login_session(|s| {
                s.with_node(MockNode::input(Locator::id("user-name")))
                    .with_node(MockNode::new(Locator::id("login-button")))
            });
            let err = login_gate().wait_for_ready(&session, &SPEC).unwrap_err();
            match err {
                PagewaitError::PageNotReady {
                    page,
                    unmet,
                    elapsed,
                } => {
                    assert_eq!(page, "login");
                    assert_eq!(unmet, "id=password visible");
                    assert_eq!(elapsed, Duration::from_secs(2));
                }
                other => panic!("expected PageNotReady, got {other:?}"),
            }
            assert_eq!(clock.now(), Duration::from_secs(2));
        }

        #[test]
        fn test_never_exceeds_one_timeout() {
            let (clock, session) = login_session(|s| s.with_title("Other"));
            assert!(login_gate().wait_for_ready(&session, &SPEC).is_err());
            assert_eq!(clock.now(), SPEC.timeout());
        }

        #[test]
        fn test_invalid_spec() {
            let (_clock, session) = login_session(|s| s);
            let err = login_gate()
                .wait_for_ready(&session, &WaitSpec::new(100, 500))
                .unwrap_err();
            assert!(matches!(err, PagewaitError::InvalidWaitSpec { .. }));
        }

        #[test]
        fn test_url_checks() {
            let (_clock, session) = login_session(|s| s.with_url("https://www.saucedemo.com/inventory.html"));
            let gate = ReadinessGate::new("inventory")
                .with_url_contains("inventory")
                .with_url_matches("/inventory.html");
            assert!(gate.wait_for_ready(&session, &SPEC).is_ok());
        }
    }

    mod is_displaying_tests {
        use super::*;

        #[test]
        fn test_single_pass_without_delay() {
            let (clock, session) = login_session(|s| {
                s.with_node(MockNode::input(Locator::id("user-name")))
                    .with_node(MockNode::new(Locator::id("login-button")))
            });
            assert!(!login_gate().is_displaying(&session));
            assert_eq!(clock.now(), Duration::ZERO);
            assert_eq!(login_gate().unmet(&session), vec!["id=password visible".to_string()]);
        }

        #[test]
        fn test_title_compared_trimmed() {
            let (_clock, session) = login_session(|s| s);
            let gate = ReadinessGate::new("login").with_title("Swag Labs ");
            assert!(gate.is_displaying(&session));
        }

        #[test]
        fn test_url_equals() {
            let (_clock, session) = login_session(|s| s);
            assert!(ReadinessGate::new("login")
                .with_url_equals("https://www.saucedemo.com/")
                .is_displaying(&session));
            assert!(!ReadinessGate::new("login")
                .with_url_equals("https://www.saucedemo.com/inventory.html")
                .is_displaying(&session));
        }

        #[test]
        fn test_driver_failure_is_false() {
            let (_clock, session) = login_session(|s| s.with_node(MockNode::input(Locator::id("user-name"))));
            session.driver().fail_lookups(true);
            let gate = ReadinessGate::new("x").with_visible(Locator::id("user-name"));
            assert!(!gate.is_displaying(&session));
        }

        #[test]
        fn test_absence_check() {
            let (_clock, session) = login_session(|s| s);
            let gate = ReadinessGate::new("no-error")
                .with_element(Locator::css("h3[data-test='error']"), Condition::Invisible);
            assert!(gate.is_displaying(&session));
        }
    }

    mod page_state_tests {
        use super::*;

        #[test]
        fn test_transitions() {
            let state = PageState::default();
            assert_eq!(state, PageState::NotLoaded);
            assert_eq!(state.on_check(false), PageState::NotLoaded);
            assert_eq!(state.on_load(false), PageState::NotLoaded);

            let loaded = state.on_load(true);
            assert_eq!(loaded, PageState::Loaded);
            assert_eq!(loaded.on_check(true), PageState::Loaded);

            let degraded = loaded.on_check(false);
            assert_eq!(degraded, PageState::Degraded);
            assert_eq!(degraded.on_check(true), PageState::Degraded);
            assert_eq!(degraded.on_load(true), PageState::Loaded);
        }
    }
}
