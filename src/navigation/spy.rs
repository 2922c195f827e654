//! Scroll spy: which heading is active right now
//!
//! The coordinator owns the single piece of shared navigation state, the
//! active heading ID. Two signals feed one decision function:
//!
//! - the distance calculator (authoritative whenever it finds a heading),
//! - the intersection tracker (consulted only when distance finds nothing).
//!
//! A distance hit always wins. When distance finds nothing, the first heading
//! the tracker reports as visible becomes active, replacing the current one
//! if it differs. Only when both signals are empty is the current heading
//! kept.
//!
//! Scroll ticks are throttled; a burst that ends inside the throttle window
//! is picked up by [`ScrollSpy::poll`]. Writes are idempotent: setting the
//! active heading to its current value notifies nobody.

use super::distance::find_closest_heading;
use super::geometry::ScrollState;
use super::intersection::{IntersectionTracker, DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD};
use super::locator::ElementLocator;
use super::surface::{probe, ScrollSurface};
use super::throttle::Throttle;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::fmt;
use std::time::{Duration, Instant};

/// Default minimum spacing between scroll-driven detections.
pub const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_millis(100);

/// Default distance between the top of the pane and the detection line.
pub const DEFAULT_SPY_OFFSET: f32 = 80.0;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for scroll-spy detection.
#[derive(Debug, Clone, PartialEq)]
pub struct SpyConfig {
    /// Detection line distance from the top of the container (pixels)
    pub offset: f32,
    /// Fraction of a heading that must be visible to count as intersecting
    pub threshold: f32,
    /// Root margin for intersection tracking
    pub root_margin: String,
    /// Minimum spacing between scroll-driven detections
    pub throttle_delay: Duration,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            offset: DEFAULT_SPY_OFFSET,
            threshold: DEFAULT_THRESHOLD,
            root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            throttle_delay: DEFAULT_THROTTLE_DELAY,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScrollSpy
// ─────────────────────────────────────────────────────────────────────────────

/// Callback invoked with the new active heading (or `None` when cleared).
pub type ActiveHeadingListener = Box<dyn FnMut(Option<&str>)>;

pub struct ScrollSpy {
    config: SpyConfig,
    heading_ids: Vec<String>,
    active_id: Option<String>,
    tracker: IntersectionTracker,
    throttle: Throttle,
    scroll_state: ScrollState,
    listeners: Vec<ActiveHeadingListener>,
    detections: usize,
}

impl fmt::Debug for ScrollSpy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSpy")
            .field("config", &self.config)
            .field("heading_ids", &self.heading_ids)
            .field("active_id", &self.active_id)
            .field("detections", &self.detections)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(SpyConfig::default())
    }
}

impl ScrollSpy {
    pub fn new(config: SpyConfig) -> Self {
        Self {
            tracker: IntersectionTracker::new(config.threshold, &config.root_margin),
            throttle: Throttle::new(config.throttle_delay),
            config,
            heading_ids: Vec::new(),
            active_id: None,
            scroll_state: ScrollState::default(),
            listeners: Vec::new(),
            detections: 0,
        }
    }

    /// Replace the configuration, restarting tracking if headings are mounted.
    pub fn set_config(&mut self, config: SpyConfig) {
        if config == self.config {
            return;
        }
        self.tracker = IntersectionTracker::new(config.threshold, &config.root_margin);
        self.throttle = Throttle::new(config.throttle_delay);
        self.config = config;
        if !self.heading_ids.is_empty() {
            self.tracker.setup_observer(&self.heading_ids);
        }
    }

    pub fn config(&self) -> &SpyConfig {
        &self.config
    }

    /// Register a listener for active heading changes.
    pub fn subscribe(&mut self, listener: ActiveHeadingListener) {
        self.listeners.push(listener);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Track a new set of heading IDs.
    ///
    /// A non-empty set re-registers the intersection tracker and runs one
    /// immediate, unthrottled detection so the initial active heading is
    /// right before any scrolling. An empty set tears everything down.
    pub fn set_headings(
        &mut self,
        heading_ids: Vec<String>,
        surface: &dyn ScrollSurface,
        locator: &dyn ElementLocator,
    ) {
        if heading_ids == self.heading_ids {
            return;
        }
        if heading_ids.is_empty() {
            self.teardown();
            return;
        }

        debug!("Scroll spy tracking {} headings", heading_ids.len());
        self.heading_ids = heading_ids;
        self.throttle.reset();
        self.tracker.setup_observer(&self.heading_ids);

        let stale = self
            .active_id
            .as_ref()
            .is_some_and(|id| !self.heading_ids.contains(id));
        if stale {
            self.apply(None);
        }
        self.run_detection(surface, locator);
    }

    /// Detach from everything and clear the active heading.
    pub fn teardown(&mut self) {
        self.tracker.cleanup();
        self.throttle.reset();
        self.heading_ids.clear();
        self.scroll_state = ScrollState::default();
        self.apply(None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scroll Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a scroll tick. Returns true if the active heading changed.
    pub fn on_scroll(
        &mut self,
        surface: &dyn ScrollSurface,
        locator: &dyn ElementLocator,
        now: Instant,
    ) -> bool {
        if self.heading_ids.is_empty() {
            return false;
        }
        self.scroll_state.advance(surface.scroll_offset(), now);
        if !self.throttle.call(now) {
            return false;
        }
        self.run_detection(surface, locator)
    }

    /// Run a pending trailing detection once the throttle window has passed.
    pub fn poll(
        &mut self,
        surface: &dyn ScrollSurface,
        locator: &dyn ElementLocator,
        now: Instant,
    ) -> bool {
        if self.heading_ids.is_empty() || !self.throttle.poll(now) {
            return false;
        }
        self.run_detection(surface, locator)
    }

    /// Whether a throttled scroll is still waiting for [`ScrollSpy::poll`].
    pub fn is_update_pending(&self) -> bool {
        self.throttle.is_pending()
    }

    fn run_detection(&mut self, surface: &dyn ScrollSurface, locator: &dyn ElementLocator) -> bool {
        match self.detect(surface, locator) {
            Ok(changed) => changed,
            Err(err) => {
                debug!("Scroll spy detection skipped: {}", err);
                false
            }
        }
    }

    fn detect(&mut self, surface: &dyn ScrollSurface, locator: &dyn ElementLocator) -> Result<bool> {
        self.detections += 1;
        let snapshot = probe(surface)?;

        let closest =
            find_closest_heading(&self.heading_ids, &snapshot, locator, self.config.offset);
        self.tracker.observe(snapshot.container_rect, locator);

        match self.decide(closest) {
            Some(id) if self.active_id.as_deref() != Some(id.as_str()) => {
                self.apply(Some(id));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Merge both signals into one candidate.
    ///
    /// The first visible intersection stands in for a missing distance hit,
    /// so it may replace the active heading. `None` means "keep current".
    fn decide(&self, closest: Option<String>) -> Option<String> {
        closest.or_else(|| self.tracker.visible_in_order().into_iter().next())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Active Heading
    // ─────────────────────────────────────────────────────────────────────────

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_id.as_deref() == Some(id)
    }

    /// Manually set the active heading.
    ///
    /// Unknown IDs are ignored with a warning and the current value is kept.
    pub fn set_active_heading(&mut self, id: &str) -> bool {
        if !self.heading_ids.iter().any(|h| h == id) {
            warn!(
                "{}. Keeping active heading {:?}.",
                Error::UnknownHeading { id: id.to_string() },
                self.active_id
            );
            return false;
        }
        if !self.is_active(id) {
            self.apply(Some(id.to_string()));
        }
        true
    }

    fn apply(&mut self, id: Option<String>) {
        if self.active_id == id {
            return;
        }
        debug!("Active heading: {:?} -> {:?}", self.active_id, id);
        self.active_id = id;
        let current = self.active_id.as_deref();
        for listener in &mut self.listeners {
            listener(current);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn heading_ids(&self) -> &[String] {
        &self.heading_ids
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll_state
    }

    pub fn tracker(&self) -> &IntersectionTracker {
        &self.tracker
    }

    /// Number of detection passes run so far.
    pub fn detections(&self) -> usize {
        self.detections
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
