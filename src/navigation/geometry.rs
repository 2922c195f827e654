//! Geometry and scroll bookkeeping types shared by the navigation engine.

use serde::{Deserialize, Serialize};
use std::time::Instant;

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle in screen coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// True when the rectangle cannot contain anything.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Overlap of two rectangles, or `None` if they do not touch.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        if bottom < top || right < left {
            return None;
        }
        Some(Rect::new(top, left, right - left, bottom - top))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll Behavior
// ─────────────────────────────────────────────────────────────────────────────

/// How a scroll command moves a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Animate towards the target
    #[default]
    Smooth,
    /// Jump straight to the target
    #[serde(alias = "instant")]
    Auto,
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll State
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of the most recent scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    Up,
    Down,
    #[default]
    None,
}

/// Transient record of the last observed scroll tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub scroll_top: f32,
    pub previous_scroll_top: f32,
    pub direction: ScrollDirection,
    pub timestamp: Option<Instant>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            scroll_top: 0.0,
            previous_scroll_top: 0.0,
            direction: ScrollDirection::None,
            timestamp: None,
        }
    }
}

impl ScrollState {
    /// Record a new scroll position.
    pub fn advance(&mut self, scroll_top: f32, now: Instant) {
        self.previous_scroll_top = self.scroll_top;
        self.scroll_top = scroll_top;
        self.direction = if scroll_top > self.previous_scroll_top {
            ScrollDirection::Down
        } else if scroll_top < self.previous_scroll_top {
            ScrollDirection::Up
        } else {
            ScrollDirection::None
        };
        self.timestamp = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 5.0, 100.0, 50.0);
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.right(), 105.0);
        assert_eq!(rect.area(), 5000.0);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        let far = Rect::new(500.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&far), None);
    }

    #[test]
    fn test_degenerate() {
        assert!(Rect::default().is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_scroll_direction() {
        let now = Instant::now();
        let mut state = ScrollState::default();
        state.advance(120.0, now);
        assert_eq!(state.direction, ScrollDirection::Down);
        state.advance(40.0, now);
        assert_eq!(state.direction, ScrollDirection::Up);
        assert_eq!(state.previous_scroll_top, 120.0);
        state.advance(40.0, now);
        assert_eq!(state.direction, ScrollDirection::None);
    }

    #[test]
    fn test_behavior_serde() {
        let smooth: ScrollBehavior = serde_json::from_str("\"smooth\"").unwrap();
        assert_eq!(smooth, ScrollBehavior::Smooth);
        let auto: ScrollBehavior = serde_json::from_str("\"instant\"").unwrap();
        assert_eq!(auto, ScrollBehavior::Auto);
        assert_eq!(serde_json::to_string(&ScrollBehavior::Auto).unwrap(), "\"auto\"");
    }
}
