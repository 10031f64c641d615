//! Condition evaluator: one non-blocking check of a locator against a
//! condition kind.
//!
//! Evaluation never fails. Lookup errors and handle errors are folded into
//! [`Evaluation::TargetAbsent`], which is kept distinct from
//! [`Evaluation::NotYetSatisfied`] because absence conditions count a missing
//! target as success.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::driver::{Driver, DriverResult, Element};
use crate::locator::Locator;
use crate::result::PagewaitError;

/// Condition a located node must satisfy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    /// Node exists in the surface (visible or not)
    Present,
    /// Node exists and is visible
    Visible,
    /// Node exists and is enabled
    Enabled,
    /// Node is visible and enabled
    Clickable,
    /// Attribute has exactly this value
    AttributeEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Attribute is present with any value
    AttributePresent(String),
    /// Visible text contains a substring
    TextContains(String),
    /// Trimmed visible text equals a value
    TextEquals(String),
    /// Node is hidden or gone
    Invisible,
}

impl Condition {
    /// Attribute equality condition
    #[must_use]
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute presence condition
    #[must_use]
    pub fn attribute_present(name: impl Into<String>) -> Self {
        Self::AttributePresent(name.into())
    }

    /// Text substring condition
    #[must_use]
    pub fn text_contains(text: impl Into<String>) -> Self {
        Self::TextContains(text.into())
    }

    /// Exact (trimmed) text condition
    #[must_use]
    pub fn text_equals(text: impl Into<String>) -> Self {
        Self::TextEquals(text.into())
    }

    /// Whether a missing target satisfies this condition
    #[must_use]
    pub const fn accepts_absence(&self) -> bool {
        matches!(self, Self::Invisible)
    }

    /// Phrase used in wait and timeout messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Present => "present".to_string(),
            Self::Visible => "visible".to_string(),
            Self::Enabled => "enabled".to_string(),
            Self::Clickable => "clickable".to_string(),
            Self::AttributeEquals { name, value } => format!("attribute `{name}` = {value:?}"),
            Self::AttributePresent(name) => format!("attribute `{name}` present"),
            Self::TextContains(text) => format!("text containing {text:?}"),
            Self::TextEquals(text) => format!("text equal to {text:?}"),
            Self::Invisible => "invisible or absent".to_string(),
        }
    }

    /// Check a resolved element against this condition
    pub fn check<E: Element>(&self, element: &E) -> DriverResult<bool> {
        Ok(match self {
            Self::Present => true,
            Self::Visible => element.is_visible()?,
            Self::Enabled => element.is_enabled()?,
            Self::Clickable => element.is_visible()? && element.is_enabled()?,
            Self::AttributeEquals { name, value } => {
                element.attribute(name)?.as_deref() == Some(value.as_str())
            }
            Self::AttributePresent(name) => element.attribute(name)?.is_some(),
            Self::TextContains(text) => element.text()?.contains(text.as_str()),
            Self::TextEquals(text) => element.text()?.trim() == text.trim(),
            Self::Invisible => !element.is_visible()?,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Visible => f.write_str("visible"),
            Self::Enabled => f.write_str("enabled"),
            Self::Clickable => f.write_str("clickable"),
            Self::AttributeEquals { name, value } => write!(f, "attribute:{name}={value}"),
            Self::AttributePresent(name) => write!(f, "attribute:{name}"),
            Self::TextContains(text) => write!(f, "text_contains:{text}"),
            Self::TextEquals(text) => write!(f, "text_equals:{text}"),
            Self::Invisible => f.write_str("invisible"),
        }
    }
}

impl FromStr for Condition {
    type Err = PagewaitError;

    /// Parse the textual form used in page definition files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = |reason: &str| PagewaitError::UnsupportedCondition {
            condition: s.to_string(),
            reason: reason.to_string(),
        };

        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg)),
            None => (s.trim(), None),
        };

        match (kind, arg) {
            ("present", None) => Ok(Self::Present),
            ("visible", None) => Ok(Self::Visible),
            ("enabled", None) => Ok(Self::Enabled),
            ("clickable", None) => Ok(Self::Clickable),
            ("invisible", None) => Ok(Self::Invisible),
            ("text_contains", Some(text)) => Ok(Self::TextContains(text.to_string())),
            ("text_equals", Some(text)) => Ok(Self::TextEquals(text.to_string())),
            ("attribute", Some(spec)) => match spec.split_once('=') {
                Some((name, _)) if name.trim().is_empty() => {
                    Err(unsupported("attribute name is empty"))
                }
                Some((name, value)) => Ok(Self::attribute_equals(name.trim(), value)),
                None if spec.trim().is_empty() => Err(unsupported("attribute name is empty")),
                None => Ok(Self::attribute_present(spec.trim())),
            },
            ("present" | "visible" | "enabled" | "clickable" | "invisible", Some(_)) => {
                Err(unsupported("this condition takes no argument"))
            }
            ("text_contains" | "text_equals" | "attribute", None) => {
                Err(unsupported("missing `:` argument"))
            }
            _ => Err(unsupported("unknown condition kind")),
        }
    }
}

impl TryFrom<String> for Condition {
    type Error = PagewaitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.to_string()
    }
}

/// Tri-state outcome of a single evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Target found and condition holds
    Satisfied,
    /// Target found, condition does not hold yet
    NotYetSatisfied,
    /// Target missing, or the lookup itself failed
    TargetAbsent,
}

impl Evaluation {
    /// Whether this outcome ends a wait for `condition`
    #[must_use]
    pub const fn is_met_for(self, condition: &Condition) -> bool {
        match self {
            Self::Satisfied => true,
            Self::NotYetSatisfied => false,
            Self::TargetAbsent => condition.accepts_absence(),
        }
    }
}

/// Evaluate `condition` against whatever `locator` resolves to right now
pub fn evaluate<D: Driver + ?Sized>(
    driver: &D,
    locator: &Locator,
    condition: &Condition,
) -> Evaluation {
    let element = match driver.find_one(locator) {
        Ok(Some(element)) => element,
        Ok(None) => return Evaluation::TargetAbsent,
        Err(err) => {
            tracing::trace!(%locator, %err, "lookup failed, treating target as absent");
            return Evaluation::TargetAbsent;
        }
    };

    match condition.check(&element) {
        Ok(true) => Evaluation::Satisfied,
        Ok(false) => Evaluation::NotYetSatisfied,
        Err(err) => {
            tracing::trace!(%locator, %err, "element went away during evaluation");
            Evaluation::TargetAbsent
        }
    }
}
