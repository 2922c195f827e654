//! Viewport intersection tracking for heading elements
//!
//! The tracker mirrors browser intersection-observer semantics on top of
//! per-frame layout: the root rectangle is shrunk or grown by a CSS-like
//! root margin, each observed element's visible fraction is measured against
//! it, and elements crossing the threshold enter or leave the visible set.
//!
//! The visible set is a secondary signal. It is never authoritative for the
//! active heading on its own.

use super::geometry::Rect;
use super::locator::ElementLocator;
use crate::error::{Error, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default fraction of an element that must be visible.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Default root margin, biased towards the upper middle of the viewport.
pub const DEFAULT_ROOT_MARGIN: &str = "-20% 0px -35% 0px";

static MARGIN_VALUE_RE: OnceLock<Regex> = OnceLock::new();

// ─────────────────────────────────────────────────────────────────────────────
// Root Margin
// ─────────────────────────────────────────────────────────────────────────────

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f32),
    Percent(f32),
}

impl MarginValue {
    fn resolve(&self, extent: f32) -> f32 {
        match self {
            MarginValue::Px(px) => *px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }
}

/// CSS-margin-like adjustment of the observer root (`top right bottom left`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    /// Grow (positive) or shrink (negative) the root rectangle.
    pub fn apply(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.top - top,
            root.left - left,
            root.width + left + right,
            root.height + top + bottom,
        )
    }
}

impl FromStr for RootMargin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let re = MARGIN_VALUE_RE.get_or_init(|| {
            Regex::new(r"^(-?\d+(?:\.\d+)?)(px|%)?$").expect("built-in pattern must compile")
        });

        let mut values = Vec::with_capacity(4);
        for token in s.split_whitespace() {
            let caps = re.captures(token).ok_or_else(|| {
                Error::ObserverUnavailable(format!("invalid root margin value '{}'", token))
            })?;
            let number: f32 = caps[1].parse().map_err(|_| {
                Error::ObserverUnavailable(format!("invalid root margin value '{}'", token))
            })?;
            let value = match caps.get(2).map(|m| m.as_str()) {
                Some("%") => MarginValue::Percent(number),
                Some(_) => MarginValue::Px(number),
                // Unitless only allowed for zero, as in CSS
                None if number == 0.0 => MarginValue::Px(0.0),
                None => {
                    return Err(Error::ObserverUnavailable(format!(
                        "root margin value '{}' needs a px or % unit",
                        token
                    )))
                }
            };
            values.push(value);
        }

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => {
                return Err(Error::ObserverUnavailable(format!(
                    "root margin '{}' must have 1 to 4 values",
                    s
                )))
            }
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Intersection Tracker
// ─────────────────────────────────────────────────────────────────────────────

/// A change in an element's visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub id: String,
    pub is_intersecting: bool,
    pub ratio: f32,
}

/// Tracks which observed heading elements are inside the (margin-adjusted)
/// root.
#[derive(Debug, Clone)]
pub struct IntersectionTracker {
    threshold: f32,
    root_margin: String,
    margin: Option<RootMargin>,
    observed: Vec<String>,
    visible: HashSet<String>,
}

impl Default for IntersectionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_ROOT_MARGIN)
    }
}

impl IntersectionTracker {
    pub fn new(threshold: f32, root_margin: &str) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            root_margin: root_margin.to_string(),
            margin: None,
            observed: Vec::new(),
            visible: HashSet::new(),
        }
    }

    /// Start observing `heading_ids`, dropping any previous observation.
    ///
    /// If the root margin cannot be parsed the tracker stays inert: the
    /// visible set remains empty and scroll-spy keeps working from distance
    /// alone.
    pub fn setup_observer(&mut self, heading_ids: &[String]) -> bool {
        self.cleanup();
        match self.root_margin.parse::<RootMargin>() {
            Ok(margin) => {
                self.margin = Some(margin);
                self.observed = heading_ids.to_vec();
                info!(
                    "Observing {} headings (threshold {}, root margin '{}')",
                    self.observed.len(),
                    self.threshold,
                    self.root_margin
                );
                true
            }
            Err(err) => {
                warn!("{}. Intersection tracking disabled.", err);
                false
            }
        }
    }

    /// Disconnect and forget every observed element.
    pub fn cleanup(&mut self) {
        self.margin = None;
        self.observed.clear();
        self.visible.clear();
    }

    pub fn is_observing(&self) -> bool {
        self.margin.is_some()
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Measure every observed element against `root` and update the visible
    /// set. Returns only the entries whose visibility changed.
    pub fn observe(&mut self, root: Rect, locator: &dyn ElementLocator) -> Vec<IntersectionEntry> {
        let Some(margin) = self.margin else {
            return Vec::new();
        };
        if root.is_degenerate() {
            return Vec::new();
        }
        let root = margin.apply(root);

        let mut changes = Vec::new();
        for id in &self.observed {
            let (is_intersecting, ratio) = match locator.element_rect(id) {
                Some(rect) => self.measure(&rect, &root),
                // A vanished element is no longer visible
                None => (false, 0.0),
            };
            let was_visible = self.visible.contains(id);
            if is_intersecting != was_visible {
                if is_intersecting {
                    self.visible.insert(id.clone());
                } else {
                    self.visible.remove(id);
                }
                changes.push(IntersectionEntry {
                    id: id.clone(),
                    is_intersecting,
                    ratio,
                });
            }
        }

        if !changes.is_empty() {
            debug!(
                "Intersection changes: {} (visible now {})",
                changes.len(),
                self.visible.len()
            );
        }
        changes
    }

    fn measure(&self, rect: &Rect, root: &Rect) -> (bool, f32) {
        let ratio = match rect.intersection(root) {
            Some(overlap) if rect.area() > 0.0 => overlap.area() / rect.area(),
            // Zero-size elements count as fully visible when they touch the root
            Some(_) => 1.0,
            None => 0.0,
        };
        let is_intersecting = if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        };
        (is_intersecting, ratio)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Visible IDs in the order they are observed (document order).
    pub fn visible_in_order(&self) -> Vec<String> {
        self.observed
            .iter()
            .filter(|id| self.visible.contains(*id))
            .cloned()
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
