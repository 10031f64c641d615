//! Failing assertions for step glue.
//!
//! Unlike probes, these return [`PagewaitError::AssertionFailed`] when the
//! expectation does not hold within the wait, with the expected and the last
//! observed value in the message.

use crate::condition::{evaluate, Condition, Evaluation};
use crate::driver::{Driver, Element};
use crate::locator::Locator;
use crate::result::{PagewaitError, PagewaitResult};
use crate::session::Session;
use crate::wait::WaitSpec;

/// Assertion entry point bound to a session
#[derive(Debug, Clone)]
pub struct Expect<'s, D> {
    session: &'s Session<D>,
    wait: WaitSpec,
}

impl<'s, D: Driver> Expect<'s, D> {
    /// Assertions using the session's default wait
    #[must_use]
    pub fn new(session: &'s Session<D>) -> Self {
        Self {
            session,
            wait: session.config().wait,
        }
    }

    /// Override the wait
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    /// Current URL equals `expected`
    pub fn url(&self, expected: &str) -> PagewaitResult<()> {
        let actual = self.settle(|| {
            let url = self.session.driver().current_url().unwrap_or_default();
            (url == expected, url)
        })?;
        actual.map_or(Ok(()), |url| {
            Err(PagewaitError::assertion(format!(
                "expected url '{expected}', got '{url}'"
            )))
        })
    }

    /// Current URL contains `fragment`
    pub fn url_contains(&self, fragment: &str) -> PagewaitResult<()> {
        let actual = self.settle(|| {
            let url = self.session.driver().current_url().unwrap_or_default();
            (url.contains(fragment), url)
        })?;
        actual.map_or(Ok(()), |url| {
            Err(PagewaitError::assertion(format!(
                "expected url '{url}' to contain '{fragment}'"
            )))
        })
    }

    /// Document title equals `expected`
    pub fn title(&self, expected: &str) -> PagewaitResult<()> {
        let actual = self.settle(|| {
            let title = self.session.driver().title().unwrap_or_default();
            (title.trim() == expected.trim(), title)
        })?;
        actual.map_or(Ok(()), |title| {
            Err(PagewaitError::assertion(format!(
                "expected title '{expected}', got '{title}'"
            )))
        })
    }

    /// Text of `locator` contains `fragment`
    pub fn text_contains(&self, locator: &Locator, fragment: &str) -> PagewaitResult<()> {
        let actual = self.settle(|| {
            let text = self
                .session
                .driver()
                .find_one(locator)
                .ok()
                .flatten()
                .and_then(|element| element.text().ok());
            match text {
                Some(text) => (text.contains(fragment), format!("'{}'", text.trim())),
                None => (false, "no element".to_string()),
            }
        })?;
        actual.map_or(Ok(()), |text| {
            Err(PagewaitError::assertion(format!(
                "expected {locator} text to contain '{fragment}', got {text}"
            )))
        })
    }

    /// `locator` is visible
    pub fn visible(&self, locator: &Locator) -> PagewaitResult<()> {
        self.condition(locator, &Condition::Visible)
    }

    /// `locator` is hidden or gone
    pub fn hidden(&self, locator: &Locator) -> PagewaitResult<()> {
        self.condition(locator, &Condition::Invisible)
    }

    fn condition(&self, locator: &Locator, condition: &Condition) -> PagewaitResult<()> {
        let driver = self.session.driver();
        let actual = self.settle(|| {
            let evaluation = evaluate(driver, locator, condition);
            let observed = match (evaluation, condition.accepts_absence()) {
                (Evaluation::TargetAbsent, _) => "absent",
                (Evaluation::Satisfied, false) | (Evaluation::NotYetSatisfied, true) => "visible",
                (Evaluation::Satisfied, true) | (Evaluation::NotYetSatisfied, false) => "hidden",
            };
            (evaluation.is_met_for(condition), observed.to_string())
        })?;
        actual.map_or(Ok(()), |observed| {
            Err(PagewaitError::assertion(format!(
                "expected {locator} to be {}, but it was {observed}",
                condition.describe()
            )))
        })
    }

    /// Poll `observe` until it reports success; `Some(last observed)` on
    /// timeout
    fn settle<F>(&self, mut observe: F) -> PagewaitResult<Option<String>>
    where
        F: FnMut() -> (bool, String),
    {
        self.wait.validate()?;
        let poller = self.session.poller();
        let mut last = String::new();
        let report = poller.poll(
            self.wait.poll_interval(),
            poller.deadline(&self.wait),
            "assertion",
            || {
                let (ok, observed) = observe();
                last = observed;
                ok
            },
        );
        Ok((!report.success).then_some(last))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::mock::{ClickEffect, MockNode, MockSurface};
    use std::sync::Arc;
    use std::time::Duration;

    fn session(surface: impl FnOnce(MockSurface) -> MockSurface) -> (Arc<ManualClock>, Session<MockSurface>) {
        let clock = Arc::new(ManualClock::new());
        let surface = surface(
            MockSurface::new(clock.clone())
                .with_url("https://www.saucedemo.com/inventory.html")
                .with_title("Swag Labs"),
        );
        (clock.clone(), Session::new(surface).with_clock(clock))
    }

    fn expect(session: &Session<MockSurface>) -> Expect<'_, MockSurface> {
        Expect::new(session).with_wait(WaitSpec::new(1000, 100))
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_url_matches() {
            let (clock, session) = session(|s| s);
            expect(&session)
                .url("https://www.saucedemo.com/inventory.html")
                .unwrap();
            expect(&session).url_contains("inventory").unwrap();
            assert_eq!(clock.now(), Duration::ZERO);
        }

        #[test]
        fn test_url_mismatch_reports_actual() {
            let (clock, session) = session(|s| s);
            let err = expect(&session).url("https://www.saucedemo.com/cart.html").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("cart.html"));
            assert!(message.contains("got 'https://www.saucedemo.com/inventory.html'"));
            assert_eq!(clock.now(), Duration::from_secs(1));
        }

        #[test]
        fn test_url_after_click_navigation() {
            let (_clock, session) = session(|s| {
                s.with_node(MockNode::new(Locator::id("checkout")).on_click(ClickEffect::Navigate {
                    url: "https://www.saucedemo.com/checkout-step-one.html".into(),
                    title: "Swag Labs".into(),
                }))
            });
            session.dispatcher().click(&Locator::id("checkout")).unwrap();
            expect(&session).url_contains("checkout-step-one").unwrap();
        }
    }

    mod title_tests {
        use super::*;

        #[test]
        fn test_title() {
            let (_clock, session) = session(|s| s);
            expect(&session).title("Swag Labs").unwrap();
            expect(&session).title(" Swag Labs ").unwrap();
            let err = expect(&session).title("Products").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Assertion failed: expected title 'Products', got 'Swag Labs'"
            );
        }
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_error_message_contains() {
            let error = Locator::css("h3[data-test='error']");
            let (_clock, session) = session(|s| {
                s.with_node(
                    MockNode::new(error.clone())
                        .text("Epic sadface: Username and password do not match")
                        .appears_after(Duration::from_millis(300)),
                )
            });
            expect(&session)
                .text_contains(&error, "do not match")
                .unwrap();
            let err = expect(&session)
                .text_contains(&error, "locked out")
                .unwrap_err();
            assert!(err.to_string().contains("Epic sadface"));
        }

        #[test]
        fn test_text_of_missing_element() {
            let (_clock, session) = session(|s| s);
            let err = expect(&session)
                .text_contains(&Locator::id("nope"), "x")
                .unwrap_err();
            assert!(err.to_string().ends_with("got no element"));
        }

        #[test]
        fn test_visible_and_hidden() {
            let (_clock, session) = session(|s| {
                s.with_node(MockNode::new(Locator::id("cart")))
                    .with_node(MockNode::new(Locator::id("menu")).hidden())
            });
            expect(&session).visible(&Locator::id("cart")).unwrap();
            expect(&session).hidden(&Locator::id("menu")).unwrap();
            expect(&session).hidden(&Locator::id("gone")).unwrap();

            let err = expect(&session).visible(&Locator::id("menu")).unwrap_err();
            assert!(err.to_string().contains("it was hidden"));
            let err = expect(&session).visible(&Locator::id("gone")).unwrap_err();
            assert!(err.to_string().contains("it was absent"));
            let err = expect(&session).hidden(&Locator::id("cart")).unwrap_err();
            assert!(err.to_string().contains("it was visible"));
        }

        #[test]
        fn test_invalid_wait() {
            let (_clock, session) = session(|s| s);
            let err = Expect::new(&session)
                .with_wait(WaitSpec::new(100, 100))
                .visible(&Locator::id("cart"))
                .unwrap_err();
            assert!(matches!(err, PagewaitError::InvalidWaitSpec { .. }));
        }
    }
}
