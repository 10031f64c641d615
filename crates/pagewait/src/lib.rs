//! Pagewait: wait/verify engine for page-object UI tests
//!
//! Every interaction with a rendered surface goes through one bounded poller.
//! On top of it sit two calling conventions and a page-level gate:
//!
//! - **Probes** answer state questions and never fail; absence reads as
//!   `false` or `""`.
//! - **Actions** wait for a precondition, then click, clear or type; a
//!   precondition that never holds is a timeout naming the locator.
//! - **Readiness gates** decide whether a page is showing, either blocking on
//!   one shared deadline or in a single pass.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  Page (YAML definition)  ──►  ElementRef  ──►  Dispatcher  │
//! │        │                                        │          │
//! │        ▼                                        ▼          │
//! │  ReadinessGate  ─────────────────────────►  Poller         │
//! │                                                 │          │
//! │                                                 ▼          │
//! │                          Condition evaluator ──► Driver     │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pagewait::{Locator, ManualClock, MockNode, MockSurface, Page, PageDefinition, Session};
//!
//! let yaml = r#"
//! name: login
//! title: Swag Labs
//! elements:
//!   username: { by: id, value: user-name }
//! ready:
//!   - element: username
//! "#;
//!
//! let clock = Arc::new(ManualClock::new());
//! let surface = MockSurface::new(clock.clone())
//!     .with_title("Swag Labs")
//!     .with_node(MockNode::input(Locator::id("user-name")));
//! let session = Session::new(surface).with_clock(clock);
//!
//! let mut page = Page::new(&session, PageDefinition::from_yaml(yaml)?)?;
//! page.wait_for_ready()?;
//! page.element("username")?.enter_text("standard_user")?;
//! assert!(page.element("username")?.is_prepopulated_with("standard_user"));
//! # Ok::<(), pagewait::PagewaitError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
mod clock;
mod condition;
mod config;
mod dispatch;
mod driver;
mod gate;
mod locator;
mod page;
mod result;
mod session;
mod wait;

/// In-memory driver for tests
pub mod mock;

pub use assertion::Expect;
pub use clock::{Clock, ManualClock, SystemClock};
pub use condition::{evaluate, Condition, Evaluation};
pub use config::{PagewaitConfig, ENV_POLL_INTERVAL_MS, ENV_PROBE_TIMEOUT_MS, ENV_TIMEOUT_MS};
pub use dispatch::{Dispatcher, Getter, Operation, ProbeResult};
pub use driver::{Driver, DriverError, DriverResult, Element};
pub use gate::{Check, PageState, ReadinessGate, UrlPattern};
pub use locator::{Locator, Selector};
pub use mock::{ClickEffect, MockElement, MockNode, MockSurface};
pub use page::{ElementRef, Page, PageDefinition, ReadyEntry};
pub use result::{PagewaitError, PagewaitResult};
pub use session::Session;
pub use wait::{
    Deadline, Poller, WaitReport, WaitSpec, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
