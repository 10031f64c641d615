//! Locators: immutable descriptors of how to find a UI node.
//!
//! A locator never holds an element handle. Every probe and action resolves it
//! again through the driver, so a re-rendered surface is always seen fresh.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup strategy plus query string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// Element id (e.g., "user-name")
    Id(String),
    /// CSS selector (e.g., "div.error-message-container")
    Css(String),
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
    /// Single class name
    ClassName(String),
    /// `name` attribute
    Name(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Exact link text
    LinkText(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a class name selector
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Create a `name` attribute selector
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a link text selector
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Short strategy tag used in messages
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::ClassName(_) => "class",
            Self::Name(_) => "name",
            Self::TestId(_) => "test-id",
            Self::LinkText(_) => "link",
        }
    }

    /// Raw query string
    #[must_use]
    pub fn query(&self) -> &str {
        match self {
            Self::Id(q)
            | Self::Css(q)
            | Self::XPath(q)
            | Self::ClassName(q)
            | Self::Name(q)
            | Self::TestId(q)
            | Self::LinkText(q) => q,
        }
    }

    /// Equivalent CSS selector, for drivers that only speak CSS.
    ///
    /// XPath and link text have no CSS form.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("[id={id:?}]")),
            Self::Css(css) => Some(css.clone()),
            Self::ClassName(class) => Some(format!(".{class}")),
            Self::Name(name) => Some(format!("[name={name:?}]")),
            Self::TestId(id) => Some(format!("[data-testid={id:?}]")),
            Self::XPath(_) | Self::LinkText(_) => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.query())
    }
}

/// A declarative descriptor of where to find a UI node.
///
/// Equality is by value; two locators built from the same selector are the
/// same locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator {
    selector: Selector,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self { selector }
    }

    /// Locate by element id
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::id(id))
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::from_selector(Selector::xpath(expr))
    }

    /// Locate by class name
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::from_selector(Selector::class_name(class))
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.selector.fmt(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_display_uses_strategy_tag() {
            assert_eq!(Selector::id("password").to_string(), "id=password");
            assert_eq!(
                Selector::xpath("//h4[text()='Password for all users:']").to_string(),
                "xpath=//h4[text()='Password for all users:']"
            );
            assert_eq!(Selector::class_name("login_wrapper").to_string(), "class=login_wrapper");
        }

        #[test]
        fn test_to_css() {
            assert_eq!(
                Selector::id("user-name").to_css().as_deref(),
                Some("[id=\"user-name\"]")
            );
            assert_eq!(Selector::class_name("error").to_css().as_deref(), Some(".error"));
            assert_eq!(
                Selector::test_id("submit").to_css().as_deref(),
                Some("[data-testid=\"submit\"]")
            );
            assert!(Selector::xpath("//div").to_css().is_none());
            assert!(Selector::link_text("Forgot?").to_css().is_none());
        }

        #[test]
        fn test_query_returns_raw_string() {
            assert_eq!(Selector::name("username").query(), "username");
            assert_eq!(Selector::css("div > span").query(), "div > span");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_equality_by_value() {
            assert_eq!(Locator::id("login-button"), Locator::id("login-button"));
            assert_ne!(Locator::id("login-button"), Locator::css("login-button"));
        }

        #[test]
        fn test_yaml_form() {
            let loc: Locator = serde_yaml_ng::from_str("{ by: id, value: user-name }").unwrap();
            assert_eq!(loc, Locator::id("user-name"));

            let loc: Locator = serde_yaml_ng::from_str("{ by: xpath, value: //h4 }").unwrap();
            assert_eq!(loc, Locator::xpath("//h4"));

            let loc: Locator =
                serde_yaml_ng::from_str("by: class_name\nvalue: login_wrapper\n").unwrap();
            assert_eq!(loc, Locator::class_name("login_wrapper"));
        }

        #[test]
        fn test_unknown_strategy_rejected() {
            let parsed: Result<Locator, _> = serde_yaml_ng::from_str("{ by: shadow, value: x }");
            assert!(parsed.is_err());
        }
    }
}
