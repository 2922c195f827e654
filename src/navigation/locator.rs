//! Element lookup by heading ID.

use super::geometry::Rect;
use std::collections::HashMap;

/// Resolves a heading ID to the screen rectangle of its laid-out element.
pub trait ElementLocator {
    /// `None` when no element with this ID exists (yet).
    fn element_rect(&self, id: &str) -> Option<Rect>;
}

/// Heading rectangles recorded by the preview while it lays out a frame.
#[derive(Debug, Clone, Default)]
pub struct LayoutMap {
    rects: HashMap<String, Rect>,
}

impl LayoutMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget last frame's layout.
    pub fn begin_frame(&mut self) {
        self.rects.clear();
    }

    pub fn record(&mut self, id: impl Into<String>, rect: Rect) {
        self.rects.insert(id.into(), rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl ElementLocator for LayoutMap {
    fn element_rect(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }
}
