//! In-memory rendered surface for testing page objects without a browser.
//!
//! `MockSurface` implements [`Driver`] over a list of scripted nodes. Nodes
//! can appear or vanish at fixed points on the session clock, so waits can be
//! exercised deterministically with a [`ManualClock`](crate::ManualClock).
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pagewait::{Locator, ManualClock, MockNode, MockSurface, Session};
//!
//! let clock = Arc::new(ManualClock::new());
//! let surface = MockSurface::new(clock.clone()).with_node(
//!     MockNode::new(Locator::id("inventory_container")).appears_after(Duration::from_millis(300)),
//! );
//! let session = Session::new(surface).with_clock(clock);
//! assert!(session.dispatcher().click(&Locator::id("inventory_container")).is_ok());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clock::Clock;
use crate::driver::{Driver, DriverError, DriverResult, Element};
use crate::locator::Locator;

/// Side effect of clicking a scripted node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Load another document
    Navigate {
        /// New URL
        url: String,
        /// New title
        title: String,
    },
    /// Make matching nodes visible
    Show(Locator),
    /// Hide matching nodes
    Hide(Locator),
    /// Replace the text of matching nodes
    SetText {
        /// Nodes to update
        locator: Locator,
        /// New text
        text: String,
    },
}

/// Scripted node builder
#[derive(Debug, Clone)]
pub struct MockNode {
    locator: Locator,
    visible: bool,
    enabled: bool,
    editable: bool,
    rejects_input: bool,
    text: String,
    value: String,
    attributes: BTreeMap<String, String>,
    appears_after: Option<Duration>,
    vanishes_after: Option<Duration>,
    on_click: Vec<ClickEffect>,
}

impl MockNode {
    /// Visible, enabled, non-editable node
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            visible: true,
            enabled: true,
            editable: false,
            rejects_input: false,
            text: String::new(),
            value: String::new(),
            attributes: BTreeMap::new(),
            appears_after: None,
            vanishes_after: None,
            on_click: Vec::new(),
        }
    }

    /// Editable input node
    #[must_use]
    pub fn input(locator: Locator) -> Self {
        Self {
            editable: true,
            ..Self::new(locator)
        }
    }

    /// Start hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set visible text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Pre-populate an input
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Only render once `delay` has passed on the surface clock
    #[must_use]
    pub const fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    /// Stop rendering once `delay` has passed on the surface clock
    #[must_use]
    pub const fn vanishes_after(mut self, delay: Duration) -> Self {
        self.vanishes_after = Some(delay);
        self
    }

    /// Refuse `clear` and typing with a not-interactable error
    #[must_use]
    pub fn rejects_input(mut self) -> Self {
        self.rejects_input = true;
        self
    }

    /// Add a click side effect
    #[must_use]
    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click.push(effect);
        self
    }
}

#[derive(Debug)]
struct NodeState {
    key: usize,
    node: MockNode,
    appear_at: Duration,
    vanish_at: Option<Duration>,
    removed: bool,
    clicks: u32,
}

impl NodeState {
    fn rendered_at(&self, now: Duration) -> bool {
        !self.removed && now >= self.appear_at && self.vanish_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    url: String,
    title: String,
    nodes: Vec<NodeState>,
    routes: HashMap<String, String>,
    navigations: Vec<String>,
    lookups: u64,
    fail_lookups: bool,
    next_key: usize,
}

impl SurfaceState {
    fn matching_mut<'a>(&'a mut self, locator: &'a Locator) -> impl Iterator<Item = &'a mut NodeState> {
        self.nodes
            .iter_mut()
            .filter(move |n| !n.removed && &n.node.locator == locator)
    }

    fn node(&self, key: usize, now: Duration) -> DriverResult<&NodeState> {
        self.nodes
            .iter()
            .find(|n| n.key == key && n.rendered_at(now))
            .ok_or(DriverError::StaleElement)
    }

    fn node_mut(&mut self, key: usize, now: Duration) -> DriverResult<&mut NodeState> {
        self.nodes
            .iter_mut()
            .find(|n| n.key == key && n.rendered_at(now))
            .ok_or(DriverError::StaleElement)
    }

    fn load(&mut self, url: &str) {
        self.url = url.to_string();
        self.title = self.routes.get(url).cloned().unwrap_or_default();
        self.navigations.push(url.to_string());
    }
}

/// Scripted surface implementing [`Driver`]
#[derive(Debug, Clone)]
pub struct MockSurface {
    state: Arc<Mutex<SurfaceState>>,
    clock: Arc<dyn Clock>,
}

impl MockSurface {
    /// Empty surface timed by `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState::default())),
            clock,
        }
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the current URL
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.state().url = url.into();
        self
    }

    /// Set the current title
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.state().title = title.into();
        self
    }

    /// Register the title served when `url` is navigated to
    #[must_use]
    pub fn with_route(self, url: impl Into<String>, title: impl Into<String>) -> Self {
        let _ = self.state().routes.insert(url.into(), title.into());
        self
    }

    /// Add a node
    #[must_use]
    pub fn with_node(self, node: MockNode) -> Self {
        self.add_node(node);
        self
    }

    /// Add a node; delays count from the clock's current time
    pub fn add_node(&self, node: MockNode) {
        let now = self.clock.now();
        let mut state = self.state();
        let key = state.next_key;
        state.next_key += 1;
        state.nodes.push(NodeState {
            key,
            appear_at: now + node.appears_after.unwrap_or_default(),
            vanish_at: node.vanishes_after.map(|d| now + d),
            removed: false,
            clicks: 0,
            node,
        });
    }

    /// Show or hide matching nodes
    pub fn set_visible(&self, locator: &Locator, visible: bool) {
        for n in self.state().matching_mut(locator) {
            n.node.visible = visible;
        }
    }

    /// Enable or disable matching nodes
    pub fn set_enabled(&self, locator: &Locator, enabled: bool) {
        for n in self.state().matching_mut(locator) {
            n.node.enabled = enabled;
        }
    }

    /// Replace the text of matching nodes
    pub fn set_text(&self, locator: &Locator, text: &str) {
        for n in self.state().matching_mut(locator) {
            n.node.text = text.to_string();
        }
    }

    /// Detach matching nodes; existing handles go stale
    pub fn remove(&self, locator: &Locator) {
        for n in self.state().matching_mut(locator) {
            n.removed = true;
        }
    }

    /// Make every lookup fail with a session error
    pub fn fail_lookups(&self, fail: bool) {
        self.state().fail_lookups = fail;
    }

    /// Number of lookups served
    #[must_use]
    pub fn lookup_count(&self) -> u64 {
        self.state().lookups
    }

    /// Clicks received by nodes matching `locator`
    #[must_use]
    pub fn click_count(&self, locator: &Locator) -> u32 {
        self.state()
            .nodes
            .iter()
            .filter(|n| &n.node.locator == locator)
            .map(|n| n.clicks)
            .sum()
    }

    /// URLs loaded so far, by navigation or click
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.state().navigations.clone()
    }

    /// Current value of the first editable node matching `locator`
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        self.state()
            .nodes
            .iter()
            .find(|n| !n.removed && n.node.editable && &n.node.locator == locator)
            .map(|n| n.node.value.clone())
    }

    /// Current title, without counting as a driver call
    #[must_use]
    pub fn title_now(&self) -> String {
        self.state().title.clone()
    }

    /// Current URL, without counting as a driver call
    #[must_use]
    pub fn url_now(&self) -> String {
        self.state().url.clone()
    }

    fn lookup(&self, locator: &Locator) -> DriverResult<Vec<MockElement>> {
        let now = self.clock.now();
        let mut state = self.state();
        state.lookups += 1;
        if state.fail_lookups {
            return Err(DriverError::session(format!("lookup of {locator} failed")));
        }
        Ok(state
            .nodes
            .iter()
            .filter(|n| &n.node.locator == locator && n.rendered_at(now))
            .map(|n| MockElement {
                surface: self.clone(),
                key: n.key,
            })
            .collect())
    }
}

impl Driver for MockSurface {
    type Element = MockElement;

    fn find_one(&self, locator: &Locator) -> DriverResult<Option<MockElement>> {
        Ok(self.lookup(locator)?.into_iter().next())
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<MockElement>> {
        self.lookup(locator)
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self.url_now())
    }

    fn title(&self) -> DriverResult<String> {
        Ok(self.title_now())
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.state().load(url);
        Ok(())
    }
}

/// Handle to a scripted node
#[derive(Debug, Clone)]
pub struct MockElement {
    surface: MockSurface,
    key: usize,
}

impl MockElement {
    fn read<T>(&self, f: impl FnOnce(&MockNode) -> T) -> DriverResult<T> {
        let now = self.surface.clock.now();
        let state = self.surface.state();
        let n = state.node(self.key, now)?;
        Ok(f(&n.node))
    }

    fn edit(&self, f: impl FnOnce(&mut String)) -> DriverResult<()> {
        let now = self.surface.clock.now();
        let mut state = self.surface.state();
        let n = state.node_mut(self.key, now)?;
        if !n.node.editable {
            return Err(DriverError::not_interactable("element is not editable"));
        }
        if n.node.rejects_input || !n.node.enabled {
            return Err(DriverError::not_interactable("element refused input"));
        }
        f(&mut n.node.value);
        Ok(())
    }
}

impl Element for MockElement {
    fn is_visible(&self) -> DriverResult<bool> {
        self.read(|n| n.visible)
    }

    fn is_enabled(&self) -> DriverResult<bool> {
        self.read(|n| n.enabled)
    }

    fn text(&self) -> DriverResult<String> {
        self.read(|n| n.text.clone())
    }

    fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.read(|n| {
            if name == "value" && n.editable {
                Some(n.value.clone())
            } else {
                n.attributes.get(name).cloned()
            }
        })
    }

    fn click(&self) -> DriverResult<()> {
        let now = self.surface.clock.now();
        let mut state = self.surface.state();
        let n = state.node_mut(self.key, now)?;
        if !n.node.visible || !n.node.enabled {
            return Err(DriverError::not_interactable("element cannot be clicked"));
        }
        n.clicks += 1;
        let effects = n.node.on_click.clone();

        for effect in effects {
            match effect {
                ClickEffect::Navigate { url, title } => {
                    state.load(&url);
                    state.title = title;
                }
                ClickEffect::Show(locator) => {
                    for m in state.matching_mut(&locator) {
                        m.node.visible = true;
                    }
                }
                ClickEffect::Hide(locator) => {
                    for m in state.matching_mut(&locator) {
                        m.node.visible = false;
                    }
                }
                ClickEffect::SetText { locator, text } => {
                    for m in state.matching_mut(&locator) {
                        m.node.text.clone_from(&text);
                    }
                }
            }
        }
        Ok(())
    }

    fn clear(&self) -> DriverResult<()> {
        self.edit(String::clear)
    }

    fn type_text(&self, text: &str) -> DriverResult<()> {
        self.edit(|value| value.push_str(text))
    }
}
